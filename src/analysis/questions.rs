//! The fixed catalog of report sections and questions.

use crate::models::{MetricKey, QuestionEntry, Section, SectionKind};

/// Build a section, numbering its questions from 1.
fn section(kind: SectionKind, title: &str, questions: &[(&str, Option<MetricKey>)]) -> Section {
    Section {
        kind,
        title: title.to_string(),
        entries: questions
            .iter()
            .enumerate()
            .map(|(i, (question, metric))| QuestionEntry {
                index: i + 1,
                question: question.to_string(),
                metric: *metric,
            })
            .collect(),
    }
}

/// Sections in report order. Only questions with a metric get a manual
/// cross-check line; the trend questions have no computable counterpart.
pub fn default_sections() -> Vec<Section> {
    vec![
        section(
            SectionKind::Difficult,
            "三个最难的问题分析结果",
            &[
                (
                    "计算每个供应商的总采购金额是多少？",
                    Some(MetricKey::SupplierTotalAmount),
                ),
                (
                    "计算每个物品类别的平均单价是多少？",
                    Some(MetricKey::CategoryMeanUnitPrice),
                ),
                (
                    "计算所有订单金额的中位数是多少？",
                    Some(MetricKey::MedianOrderAmount),
                ),
            ],
        ),
        section(
            SectionKind::Trend,
            "三个趋势分析问题结果",
            &[
                ("分析各供应商的采购金额随时间的变化趋势", None),
                ("分析各物品类别的采购数量随时间的变化趋势", None),
                ("分析平均单价随时间的变化趋势", None),
            ],
        ),
        section(
            SectionKind::Basic,
            "基础统计问题结果",
            &[
                ("数据集中一共有多少条采购记录？", Some(MetricKey::TotalRecords)),
                ("所有订单的总采购金额是多少？", Some(MetricKey::TotalAmount)),
                ("一共有多少个不同的供应商？", Some(MetricKey::DistinctSuppliers)),
                ("一共有多少个不同的物品类别？", Some(MetricKey::DistinctCategories)),
                ("所有订单的平均单价是多少？", Some(MetricKey::MeanUnitPrice)),
                ("单笔订单金额的最大值是多少？", Some(MetricKey::MaxOrderAmount)),
                ("单笔订单金额的最小值是多少？", Some(MetricKey::MinOrderAmount)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_numbered_per_section() {
        for section in default_sections() {
            for (i, entry) in section.entries.iter().enumerate() {
                assert_eq!(entry.index, i + 1);
            }
        }
    }

    #[test]
    fn test_difficult_questions_are_cross_checked() {
        let sections = default_sections();
        let difficult = sections
            .iter()
            .find(|s| s.kind == SectionKind::Difficult)
            .unwrap();

        assert_eq!(difficult.entries.len(), 3);
        assert!(difficult.entries.iter().all(|e| e.metric.is_some()));
    }

    #[test]
    fn test_trend_questions_have_no_metric() {
        let sections = default_sections();
        let trend = sections.iter().find(|s| s.kind == SectionKind::Trend).unwrap();
        assert!(trend.entries.iter().all(|e| e.metric.is_none()));
    }
}
