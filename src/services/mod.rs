pub mod excel;
pub mod indebtedness;
pub mod report;
pub mod timing;
pub mod watchlist;
