pub mod alert;
pub mod board_text;
