use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CareCal API",
        version = "1.0.0",
        description = "Calendar, diary insights and schedule management for elderly users and their caregivers"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Calendar
        crate::handlers::calendar_handler::get_calendar,

        // Insights
        crate::handlers::insights_handler::get_diary_insights,
        crate::handlers::insights_handler::get_health_insights,

        // Schedules
        crate::handlers::schedules_handler::create_schedule,
        crate::handlers::schedules_handler::update_schedule,
        crate::handlers::schedules_handler::delete_schedule,
        crate::handlers::schedules_handler::complete_schedule,
        crate::handlers::schedules_handler::cancel_schedule,

        // Connections
        crate::handlers::connections_handler::get_connections,
    ),
    components(
        schemas(
            // Records
            crate::models::schedule::ScheduleWire,
            crate::models::CreatorType,
            crate::models::Category,
            crate::models::ScheduleStatus,
            crate::models::RecurringType,
            crate::models::DiaryRecord,
            crate::models::Mood,
            crate::models::DiaryStatus,

            // Users
            crate::models::Role,
            crate::models::ConnectedElderly,
            crate::models::Connection,

            // Stats
            crate::models::StatsPeriod,
            crate::models::CategorySummary,
            crate::models::DetailedStats,

            // Schedule mutations
            crate::models::CreateScheduleInput,
            crate::models::UpdateScheduleInput,
            crate::models::ScheduleMutationResponse,

            // Calendar
            crate::calendar::ViewMode,
            crate::calendar::RecordKind,
            crate::calendar::DateWindow,
            crate::calendar::CategoryFilter,
            crate::calendar::GroupBy,
            crate::handlers::calendar_handler::CalendarResponse,

            // Insights
            crate::calendar::StreakSummary,
            crate::calendar::Heatmap,
            crate::calendar::heatmap::HeatmapCell,
            crate::calendar::TodayStatus,
            crate::calendar::completion::CountStatus,
            crate::calendar::completion::ExerciseStatus,
            crate::calendar::completion::UpcomingAppointment,
            crate::calendar::CategoryRatio,
            crate::calendar::completion::HealthNote,
            crate::calendar::HealthReport,
            crate::handlers::insights_handler::DiaryInsightsResponse,
            crate::handlers::insights_handler::HealthInsightsResponse,

            // Connections
            crate::handlers::connections_handler::ConnectionsResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "calendar", description = "Merged schedule and diary calendar"),
        (name = "insights", description = "Diary streaks, mood heatmap and health status"),
        (name = "schedules", description = "Schedule management"),
        (name = "connections", description = "Elderly and caregiver connections"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(crate::extractors::USER_ID_HEADER))),
            );
            components.add_security_scheme(
                "user_role",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(crate::extractors::USER_ROLE_HEADER))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
