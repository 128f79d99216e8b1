mod make_box;

pub use make_box::MakeBox;
