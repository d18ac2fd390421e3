use crate::domain::error::Result;
use crate::infrastructure::db::CrmRepository;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub roas: f64,
    pub aov: f64,
    pub closed_won_deals: i64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Return on ad spend. Zero when nothing was spent.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        revenue / spend
    } else {
        0.0
    }
}

/// Average order value. Zero when there are no orders.
pub fn aov(revenue: f64, orders: i64) -> f64 {
    if orders > 0 {
        revenue / orders as f64
    } else {
        0.0
    }
}

pub struct AnalyticsUseCase {
    repository: Arc<CrmRepository>,
}

impl AnalyticsUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    /// Revenue is client ad revenue plus the value of every closed-won deal.
    pub async fn execute(&self) -> Result<AnalyticsSummary> {
        let ((spend, ad_revenue), (won_value, won_count)) = tokio::try_join!(
            self.repository.client_ad_totals(),
            self.repository.closed_won_totals(),
        )?;
        let revenue = ad_revenue + won_value;

        Ok(AnalyticsSummary {
            total_spend: round2(spend),
            total_revenue: round2(revenue),
            roas: round2(roas(revenue, spend)),
            aov: round2(aov(revenue, won_count)),
            closed_won_deals: won_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::{DealStage, NewDeal};
    use crate::domain::records::ClientAdInput;

    #[test]
    fn ratios_are_zero_without_denominator() {
        assert_eq!(roas(500.0, 0.0), 0.0);
        assert_eq!(aov(500.0, 0), 0.0);
        assert_eq!(round2(10.0 / 3.0), 3.33);
    }

    #[tokio::test]
    async fn revenue_includes_closed_won_deals() {
        let repository = Arc::new(CrmRepository::in_memory().await.unwrap());
        repository
            .create_client_ad(&ClientAdInput {
                client_id: None,
                name: "Spring promo".to_string(),
                platform: Some("meta".to_string()),
                spend: Some(300.0),
                revenue: Some(600.0),
                status: None,
            })
            .await
            .unwrap();
        for (value, stage) in [
            (1000.0, DealStage::ClosedWon),
            (500.0, DealStage::ClosedWon),
            (9999.0, DealStage::ClosedLost),
        ] {
            repository
                .create_deal(&NewDeal {
                    client_id: None,
                    lead_id: None,
                    meeting_id: None,
                    name: "Deal".to_string(),
                    value,
                    min_value: None,
                    max_value: None,
                    stage,
                    closer_id: None,
                })
                .await
                .unwrap();
        }

        let summary = AnalyticsUseCase::new(repository).execute().await.unwrap();
        assert_eq!(summary.total_spend, 300.0);
        assert_eq!(summary.total_revenue, 2100.0);
        assert_eq!(summary.roas, 7.0);
        assert_eq!(summary.aov, 1050.0);
        assert_eq!(summary.closed_won_deals, 2);
    }
}
