//! sea-orm entities for the CMS tables plus connection helpers.

pub mod errors;
pub mod db;
pub mod validation;
pub mod service_category;
pub mod service;
pub mod industry;
pub mod expert;
pub mod service_expert;
pub mod industry_expert;
pub mod case_study;
pub mod insight;
pub mod leader;
pub mod partner;
pub mod testimonial;
pub mod affiliation;
pub mod contact_message;

#[cfg(test)]
mod tests;
