//! Agregações nativas sobre a tabela enriquecida.
//!
//! Cada operação agrupa as linhas pela chave, calcula médias das taxas, soma
//! dos custos e a contagem de linhas. Não há deduplicação por identificador de
//! campanha: linhas repetidas contam como eventos independentes.

use std::collections::BTreeMap;
use chrono::NaiveDate;
use crate::analysis::summary::{DailySummary, GroupSummary, Kpis, OverallMetrics, SegmentChannel};
use crate::campaign::{CampaignTable, EnrichedRecord};
use crate::error::{ComputationError, Result};

/// Tamanho mínimo de grupo no cruzamento segmento × canal
pub const MIN_CROSS_GROUP_SIZE: usize = 10;

#[derive(Debug, Default, Clone)]
struct Accumulator {
    count: usize,
    conversion: f64,
    roi: f64,
    engagement: f64,
    cost: f64,
    clicks: u64,
}

impl Accumulator {
    fn push(&mut self, row: &EnrichedRecord) {
        let r = &row.record;
        self.count += 1;
        self.conversion += r.conversion_rate;
        self.roi += r.roi;
        self.engagement += r.engagement_score;
        self.cost += r.acquisition_cost;
        self.clicks += r.clicks;
    }

    fn mean(&self, sum: f64) -> f64 {
        sum / self.count as f64
    }

    fn into_summary<K>(self, key: K) -> GroupSummary<K> {
        GroupSummary {
            key,
            avg_conversion: self.mean(self.conversion),
            avg_roi: self.mean(self.roi),
            campaign_count: self.count,
            avg_engagement: self.mean(self.engagement),
            total_cost: self.cost,
        }
    }
}

fn group_by<K, F>(table: &CampaignTable, key_fn: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    F: Fn(&EnrichedRecord) -> K,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for row in table {
        groups.entry(key_fn(row)).or_default().push(row);
    }
    groups
}

/// Ordena por ROI médio decrescente, desempate pela chave
fn sort_by_roi_desc<K: Ord>(rows: &mut [GroupSummary<K>]) {
    rows.sort_by(|a, b| b.avg_roi.total_cmp(&a.avg_roi).then_with(|| a.key.cmp(&b.key)));
}

/// Métricas globais
pub fn overall_metrics(table: &CampaignTable) -> Result<OverallMetrics> {
    if table.is_empty() {
        return Err(ComputationError::EmptyInput {
            operation: "overall_metrics",
        }
        .into());
    }

    let mut acc = Accumulator::default();
    let mut ctr_sum = 0.0;
    let mut ctr_count = 0usize;
    for row in table {
        acc.push(row);
        if row.metrics.ctr.is_finite() {
            ctr_sum += row.metrics.ctr;
            ctr_count += 1;
        }
    }

    Ok(OverallMetrics {
        avg_conversion_rate: acc.mean(acc.conversion),
        avg_roi: acc.mean(acc.roi),
        total_spend: acc.cost,
        avg_ctr: if ctr_count == 0 {
            f64::NAN
        } else {
            ctr_sum / ctr_count as f64
        },
        avg_engagement: acc.mean(acc.engagement),
        campaign_count: acc.count,
    })
}

/// Desempenho por canal, ROI médio decrescente
pub fn by_channel(table: &CampaignTable) -> Vec<GroupSummary<String>> {
    let mut rows: Vec<_> = group_by(table, |r| r.record.channel.clone())
        .into_iter()
        .map(|(key, acc)| acc.into_summary(key))
        .collect();
    sort_by_roi_desc(&mut rows);
    rows
}

/// Desempenho por segmento de cliente, ROI médio decrescente
pub fn by_segment(table: &CampaignTable) -> Vec<GroupSummary<String>> {
    let mut rows: Vec<_> = group_by(table, |r| r.record.segment.clone())
        .into_iter()
        .map(|(key, acc)| acc.into_summary(key))
        .collect();
    sort_by_roi_desc(&mut rows);
    rows
}

/// Série temporal diária em ordem cronológica crescente
pub fn by_date(table: &CampaignTable) -> Vec<DailySummary> {
    group_by(table, |r| r.record.date)
        .into_iter()
        .map(|(date, acc): (NaiveDate, Accumulator)| DailySummary {
            date,
            avg_roi: acc.mean(acc.roi),
            avg_conversion: acc.mean(acc.conversion),
            total_clicks: acc.clicks,
            daily_spend: acc.cost,
            campaign_count: acc.count,
        })
        .collect()
}

/// Cruzamento segmento × canal, descartando grupos com menos de
/// [`MIN_CROSS_GROUP_SIZE`] linhas
pub fn by_segment_channel(table: &CampaignTable) -> Vec<GroupSummary<SegmentChannel>> {
    let mut rows: Vec<_> = group_by(table, |r| {
        SegmentChannel::new(r.record.segment.clone(), r.record.channel.clone())
    })
    .into_iter()
    .filter(|(_, acc)| acc.count >= MIN_CROSS_GROUP_SIZE)
    .map(|(key, acc)| acc.into_summary(key))
    .collect();
    sort_by_roi_desc(&mut rows);
    rows
}

/// Cruzamento segmento × canal completo, sem tamanho mínimo de grupo.
///
/// Ordenado por segmento e, dentro dele, por ROI médio decrescente.
pub fn by_segment_channel_all(table: &CampaignTable) -> Vec<GroupSummary<SegmentChannel>> {
    let mut rows: Vec<_> = group_by(table, |r| {
        SegmentChannel::new(r.record.segment.clone(), r.record.channel.clone())
    })
    .into_iter()
    .map(|(key, acc)| acc.into_summary(key))
    .collect();
    rows.sort_by(|a, b| {
        a.key
            .segment
            .cmp(&b.key.segment)
            .then_with(|| b.avg_roi.total_cmp(&a.avg_roi))
            .then_with(|| a.key.channel.cmp(&b.key.channel))
    });
    rows
}

/// Calcula o conjunto de KPIs usado nos gráficos e no relatório
pub fn calculate_kpis(table: &CampaignTable) -> Result<Kpis> {
    let overall = overall_metrics(table)?;
    let kpis = Kpis {
        overall,
        channels: by_channel(table),
        segments: by_segment(table),
        temporal: by_date(table),
        segment_channel_all: by_segment_channel_all(table),
    };

    tracing::info!(
        channels = kpis.channels.len(),
        segments = kpis.segments.len(),
        days = kpis.temporal.len(),
        "KPIs calculados"
    );

    Ok(kpis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::fixtures::record;
    use crate::campaign::CampaignRecord;

    fn table(records: Vec<CampaignRecord>) -> CampaignTable {
        CampaignTable::from_records(records)
    }

    #[test]
    fn test_channel_aggregation_sorted_by_mean_roi() {
        let t = table(vec![
            record("A", "s1", 4.0),
            record("A", "s1", 6.0),
            record("B", "s1", 8.0),
        ]);

        let channels = by_channel(&t);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].key, "B");
        assert_eq!(channels[0].avg_roi, 8.0);
        assert_eq!(channels[1].key, "A");
        assert_eq!(channels[1].avg_roi, 5.0);
        assert_eq!(channels[1].campaign_count, 2);
        assert_eq!(channels[1].total_cost, 1000.0);
    }

    #[test]
    fn test_segment_aggregation() {
        let t = table(vec![
            record("Email", "Foodies", 3.0),
            record("Email", "Tech", 9.0),
            record("Social", "Tech", 7.0),
        ]);

        let segments = by_segment(&t);
        assert_eq!(segments[0].key, "Tech");
        assert_eq!(segments[0].avg_roi, 8.0);
        assert_eq!(segments[0].campaign_count, 2);
        assert_eq!(segments[1].key, "Foodies");
    }

    #[test]
    fn test_temporal_aggregation_is_chronological() {
        let mut late = record("A", "s", 9.0);
        late.date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let mut early = record("A", "s", 1.0);
        early.date = NaiveDate::from_ymd_opt(2021, 1, 15).unwrap();
        let mut middle = record("B", "s", 5.0);
        middle.date = NaiveDate::from_ymd_opt(2021, 2, 10).unwrap();
        let mut early_again = early.clone();
        early_again.roi = 3.0;

        let daily = by_date(&table(vec![late, early, middle, early_again]));
        assert_eq!(daily.len(), 3);
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(daily[0].avg_roi, 2.0);
        assert_eq!(daily[0].total_clicks, 200);
        assert_eq!(daily[0].daily_spend, 1000.0);
    }

    #[test]
    fn test_cross_tab_drops_small_groups() {
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(record("Email", "Tech", 5.0 + i as f64 * 0.1));
        }
        for _ in 0..9 {
            records.push(record("Social", "Tech", 9.0));
        }

        let cross = by_segment_channel(&table(records));
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].key, SegmentChannel::new("Tech", "Email"));
        assert_eq!(cross[0].campaign_count, 10);
    }

    #[test]
    fn test_full_cross_tab_keeps_small_groups() {
        let t = table(vec![
            record("Email", "Tech", 2.0),
            record("Social", "Tech", 8.0),
            record("Email", "Foodies", 1.0),
            record("Email", "Foodies", 3.0),
        ]);

        assert!(by_segment_channel(&t).is_empty());

        let all = by_segment_channel_all(&t);
        let keys: Vec<_> = all.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, vec!["Foodies × Email", "Tech × Social", "Tech × Email"]);
        assert_eq!(all[0].campaign_count, 2);
        assert_eq!(all[0].avg_roi, 2.0);
    }

    #[test]
    fn test_duplicate_ids_are_counted_independently() {
        let t = table(vec![record("A", "s", 2.0), record("A", "s", 4.0)]);
        assert_eq!(t.records()[0].record.campaign_id, t.records()[1].record.campaign_id);
        assert_eq!(by_channel(&t)[0].campaign_count, 2);
    }

    #[test]
    fn test_overall_metrics_ignores_non_finite_ctr() {
        let mut zero = record("A", "s", 2.0);
        zero.impressions = 0;
        let t = table(vec![record("A", "s", 4.0), zero]);

        let overall = overall_metrics(&t).unwrap();
        assert_eq!(overall.avg_roi, 3.0);
        assert!((overall.avg_ctr - 0.1).abs() < 1e-12);
        assert_eq!(overall.total_spend, 1000.0);
        assert_eq!(overall.campaign_count, 2);
    }

    #[test]
    fn test_empty_table() {
        let t = CampaignTable::default();
        assert!(by_channel(&t).is_empty());
        assert!(by_date(&t).is_empty());
        assert!(by_segment_channel(&t).is_empty());
        assert!(overall_metrics(&t).is_err());
    }
}
