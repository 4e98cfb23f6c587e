pub mod init;
pub mod lifetime_risk;
pub mod replay;
pub mod run;
pub mod validate;
