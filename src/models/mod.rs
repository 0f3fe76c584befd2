pub mod domain_record;
pub mod risk_assessment;
pub mod whois_snapshot;

pub use domain_record::{DetectionStats, DomainRecord};
pub use risk_assessment::{RiskAssessment, RiskLevel};
pub use whois_snapshot::WhoisSnapshot;
