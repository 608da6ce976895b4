pub mod category_service;
pub mod catalog_service;
pub mod industry_service;
pub mod expert_service;
pub mod leader_service;
pub mod case_study_service;
pub mod insight_service;
pub mod partner_service;
pub mod testimonial_service;
pub mod affiliation_service;
pub mod contact_message_service;
pub mod stats_service;
