//! Dashboard query handlers.

mod get_dashboard_overview;

pub use get_dashboard_overview::{
    DashboardOverview, GetDashboardOverviewHandler, GetDashboardOverviewQuery,
    GetDashboardOverviewResult,
};
