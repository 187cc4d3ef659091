pub mod carousel;
pub mod catalog;
pub mod discover;
pub mod home;
pub mod library;
pub mod navigation;
