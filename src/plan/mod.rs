mod payment_plan;
mod schedule;

pub use payment_plan::{NewPlan, PaymentPlan, PaymentPlanTransaction, PlanStatus, TransactionStatus};
pub use schedule::{
    check_installment_count, compute_installment, generate_schedule, split_installments, Frequency,
    ScheduledInstallment, MAX_INSTALLMENTS, MIN_INSTALLMENTS,
};
