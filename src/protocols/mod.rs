pub mod accrual;
pub mod premium;
