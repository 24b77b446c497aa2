pub mod chain;
pub mod genesis;
pub mod maturity;
pub mod orphan;
pub mod pow;
