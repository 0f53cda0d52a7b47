mod diary;
pub use diary::Diary;

mod home;
pub use home::Home;
