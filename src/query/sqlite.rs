//! Motor de consultas SQL em memória (SQLite embutido).

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use crate::analysis::aggregate::MIN_CROSS_GROUP_SIZE;
use crate::analysis::summary::{CohortSummary, GroupSummary, SegmentChannel};
use crate::campaign::CampaignTable;
use crate::error::{ComputationError, MarketingError, Result};
use crate::traits::QueryEngine;

const TABLE_SCHEMA: &str = r#"
DROP TABLE IF EXISTS marketing_data;
CREATE TABLE marketing_data (
    campaign_id      TEXT    NOT NULL,
    date             TEXT    NOT NULL,
    channel          TEXT    NOT NULL,
    segment          TEXT    NOT NULL,
    impressions      INTEGER NOT NULL,
    clicks           INTEGER NOT NULL,
    acquisition_cost REAL    NOT NULL,
    conversion_rate  REAL    NOT NULL,
    roi              REAL    NOT NULL,
    engagement_score REAL    NOT NULL
);
"#;

const CROSSTAB_QUERY: &str = r#"
SELECT segment,
       channel,
       AVG(conversion_rate)  AS avg_conversion,
       AVG(roi)              AS avg_roi,
       COUNT(*)              AS campaign_count,
       AVG(engagement_score) AS avg_engagement,
       SUM(acquisition_cost) AS total_cost
FROM marketing_data
GROUP BY segment, channel
HAVING COUNT(*) >= ?1
ORDER BY avg_roi DESC, segment, channel
"#;

const COHORT_QUERY: &str = r#"
SELECT strftime('%Y-%m-01', date)  AS cohort_month,
       segment,
       COUNT(DISTINCT campaign_id) AS campaigns,
       AVG(roi)                    AS avg_roi,
       AVG(conversion_rate)        AS avg_conversion
FROM marketing_data
GROUP BY cohort_month, segment
ORDER BY cohort_month, segment
"#;

/// Motor SQLite em memória, aberto e fechado explicitamente a cada execução
pub struct SqliteEngine {
    conn: Connection,
    registered: bool,
}

impl SqliteEngine {
    /// Abre um banco em memória vazio
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        tracing::debug!("Motor de consultas SQLite aberto em memória");
        Ok(Self {
            conn,
            registered: false,
        })
    }

    fn ensure_registered(&self, operation: &'static str) -> Result<()> {
        if self.registered {
            Ok(())
        } else {
            Err(ComputationError::TableNotRegistered { operation }.into())
        }
    }

    fn row_to_group(row: &Row) -> rusqlite::Result<GroupSummary<SegmentChannel>> {
        let segment: String = row.get("segment")?;
        let channel: String = row.get("channel")?;
        let count: i64 = row.get("campaign_count")?;

        Ok(GroupSummary {
            key: SegmentChannel::new(segment, channel),
            avg_conversion: row.get("avg_conversion")?,
            avg_roi: row.get("avg_roi")?,
            campaign_count: count as usize,
            avg_engagement: row.get("avg_engagement")?,
            total_cost: row.get("total_cost")?,
        })
    }
}

fn query_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> MarketingError {
    move |err| {
        ComputationError::Query {
            operation,
            message: err.to_string(),
        }
        .into()
    }
}

impl QueryEngine for SqliteEngine {
    fn register(&mut self, table: &CampaignTable) -> Result<()> {
        self.conn.execute_batch(TABLE_SCHEMA)?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO marketing_data (campaign_id, date, channel, segment, impressions, clicks,
                                             acquisition_cost, conversion_rate, roi, engagement_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for row in table {
                let r = &row.record;
                stmt.execute(params![
                    r.campaign_id,
                    r.date.format("%Y-%m-%d").to_string(),
                    r.channel,
                    r.segment,
                    r.impressions as i64,
                    r.clicks as i64,
                    r.acquisition_cost,
                    r.conversion_rate,
                    r.roi,
                    r.engagement_score,
                ])?;
            }
        }
        tx.commit()?;

        self.registered = true;
        tracing::info!(rows = table.len(), "Tabela registrada no motor de consultas");
        Ok(())
    }

    fn segment_channel_crosstab(&self) -> Result<Vec<GroupSummary<SegmentChannel>>> {
        const OPERATION: &str = "segment_channel_crosstab";
        self.ensure_registered(OPERATION)?;

        let mut stmt = self.conn.prepare(CROSSTAB_QUERY).map_err(query_error(OPERATION))?;
        let rows = stmt
            .query_map([MIN_CROSS_GROUP_SIZE as i64], Self::row_to_group)
            .map_err(query_error(OPERATION))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_error(OPERATION))?;

        Ok(rows)
    }

    fn cohort_analysis(&self) -> Result<Vec<CohortSummary>> {
        const OPERATION: &str = "cohort_analysis";
        self.ensure_registered(OPERATION)?;

        let mut stmt = self.conn.prepare(COHORT_QUERY).map_err(query_error(OPERATION))?;
        let raw = stmt
            .query_map([], |row| {
                let month: String = row.get("cohort_month")?;
                let campaigns: i64 = row.get("campaigns")?;
                Ok((
                    month,
                    row.get::<_, String>("segment")?,
                    campaigns as usize,
                    row.get::<_, f64>("avg_roi")?,
                    row.get::<_, f64>("avg_conversion")?,
                ))
            })
            .map_err(query_error(OPERATION))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_error(OPERATION))?;

        raw.into_iter()
            .map(|(month, segment, campaigns, avg_roi, avg_conversion)| {
                let cohort_month = NaiveDate::parse_from_str(&month, "%Y-%m-%d").map_err(|e| {
                    MarketingError::from(ComputationError::Query {
                        operation: OPERATION,
                        message: format!("mês de coorte inválido '{}': {}", month, e),
                    })
                })?;
                Ok(CohortSummary {
                    cohort_month,
                    segment,
                    campaigns,
                    avg_roi,
                    avg_conversion,
                })
            })
            .collect()
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| MarketingError::from(err))?;
        tracing::debug!("Motor de consultas fechado");
        Ok(())
    }
}
