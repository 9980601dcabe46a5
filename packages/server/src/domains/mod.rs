pub mod onboarding;
pub mod verification;
