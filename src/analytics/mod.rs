//! Aggregate ownership analytics
//!
//! Chart-free versions of the dashboard's summary queries: headline
//! counts, total reported asset value and the largest manager-to-company
//! holdings. Rendering is left to the caller.

use crate::errors::{RagError, Result};
use crate::graph::{queries, QueryExecutor, QueryTable};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Headline figures for the ownership graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipOverview {
    pub managers: u64,
    pub companies: u64,
    pub assets_in_billions: f64,
}

/// One manager-to-company holding aggregated over its filings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub manager: String,
    pub company: String,
    #[serde(rename = "valueInBillions")]
    pub value_in_billions: f64,
}

/// Read-only analytics over the ownership graph
pub struct AnalyticsService {
    executor: Arc<dyn QueryExecutor>,
}

impl AnalyticsService {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Manager count, company count and total asset value in billions
    pub async fn overview(&self) -> Result<OwnershipOverview> {
        let managers = self
            .executor
            .run(queries::MANAGER_COUNT, json!({}))
            .await?;
        let companies = self
            .executor
            .run(queries::COMPANY_COUNT, json!({}))
            .await?;
        let assets = self
            .executor
            .run(queries::TOTAL_ASSET_VALUE, json!({}))
            .await?;

        Ok(OwnershipOverview {
            managers: single_value(&managers)?.as_u64().unwrap_or(0),
            companies: single_value(&companies)?.as_u64().unwrap_or(0),
            assets_in_billions: single_value(&assets)?.as_f64().unwrap_or(0.0),
        })
    }

    /// The `limit` largest manager-to-company holdings by value
    pub async fn top_holdings(&self, limit: usize) -> Result<Vec<Holding>> {
        let table = self
            .executor
            .run(queries::TOP_HOLDINGS, json!({ "limit": limit }))
            .await?;

        table
            .into_records()
            .into_iter()
            .map(|record| {
                serde_json::from_value(serde_json::Value::Object(record))
                    .map_err(RagError::SerializationError)
            })
            .collect()
    }
}

/// First cell of a single-row aggregate result
fn single_value(table: &QueryTable) -> Result<serde_json::Value> {
    table
        .rows
        .first()
        .and_then(|row| row.first())
        .cloned()
        .ok_or_else(|| RagError::GraphApiError("Empty aggregate result".to_string()))
}
