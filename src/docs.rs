use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

use crate::api::approval::{ApprovalAction, PendingApproval};
use crate::api::balance::BalanceResponse;
use crate::api::delegation::CreateDelegation;
use crate::api::holiday::{CreateHoliday, UpdateHoliday};
use crate::api::leave_request::{CreateLeave, UpdateLeave};
use crate::api::leave_type::{CreateLeaveType, UpdateLeaveType};
use crate::api::report::{CalendarEntry, DepartmentSummary};
use crate::api::user::UpdateUser;
use crate::model::delegation::Delegation;
use crate::model::holiday::Holiday;
use crate::model::leave_request::LeaveRequest;
use crate::model::leave_type::LeaveType;
use crate::model::role::Role;
use crate::model::status::{ApprovalStatus, RequestStatus};
use crate::model::user::User;
use crate::model::workflow::ApprovalStep;
use crate::models::{LoginReq, RegisterReq};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management System

HR portal backend for employee leave requests with multi-level approval
workflows.

### Key features
- **Leave requests** — apply, edit, cancel; working days exclude weekends and
  declared holidays
- **Approval chains** — manager, manager's manager and HR admin levels,
  cleared strictly in order, with delegation support
- **Balance ledger** — per user/type/year quotas with reserved and used days
- **Holidays & delegations** — HR-managed calendar, temporary approval handover

### Security
All endpoints except login use **JWT Bearer authentication**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::me,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::get_team,

        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::deactivate_leave_type,

        crate::api::balance::my_balances,
        crate::api::balance::user_balances,
        crate::api::balance::initialize_balances,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::approval::approve_leave,
        crate::api::approval::reject_leave,
        crate::api::approval::my_pending_approvals,

        crate::api::holiday::list_holidays,
        crate::api::holiday::holidays_by_year,
        crate::api::holiday::create_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::delegation::create_delegation,
        crate::api::delegation::active_delegations,
        crate::api::delegation::cancel_delegation,

        crate::api::report::team_calendar,
        crate::api::report::leave_summary,
    ),
    components(
        schemas(
            Role,
            RequestStatus,
            ApprovalStatus,
            User,
            LeaveType,
            LeaveRequest,
            ApprovalStep,
            Delegation,
            Holiday,
            RegisterReq,
            LoginReq,
            UpdateUser,
            CreateLeaveType,
            UpdateLeaveType,
            BalanceResponse,
            CreateLeave,
            UpdateLeave,
            ApprovalAction,
            PendingApproval,
            CreateHoliday,
            UpdateHoliday,
            CreateDelegation,
            CalendarEntry,
            DepartmentSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication APIs"),
        (name = "Users", description = "User directory APIs"),
        (name = "Leave Types", description = "Leave type administration APIs"),
        (name = "Balances", description = "Leave balance APIs"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "Approvals", description = "Approval workflow APIs"),
        (name = "Holidays", description = "Holiday calendar APIs"),
        (name = "Delegations", description = "Approval delegation APIs"),
        (name = "Reports", description = "Reporting APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
