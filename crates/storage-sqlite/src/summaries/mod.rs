mod model;
mod repository;

pub use model::DailySummaryDB;
pub use repository::DailySummaryRepository;
