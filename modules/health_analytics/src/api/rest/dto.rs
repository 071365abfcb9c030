use serde::{Deserialize, Serialize};

/// REST DTO returned by create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedDto {
    pub id: String,
}

/// REST DTO for list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListDto<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for RecordListDto<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Query parameters for `/v1/summaries/daily`
#[derive(Debug, Clone, Deserialize)]
pub struct DailySummaryQuery {
    pub user_id: String,
    pub date: String,
}

/// Query parameters for `/v1/summaries/weekly`
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklySummaryQuery {
    pub user_id: String,
    pub start_date: String,
    pub end_date: String,
}
