pub mod dedup;
pub mod frame;
pub mod image_source;

pub use dedup::DuplicateFilter;
pub use frame::SurveyFrame;
pub use image_source::ImageSource;
