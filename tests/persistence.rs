//! End-to-end mapping against a live Postgres. Every test returns early when
//! `DATABASE_URL` is not set; each one registers its own user so runs do not
//! interfere with each other.

use chrono::NaiveDate;
use moodtrack::models::{DaylogInput, DaylogPatch, MoodLabel, NewUser, Tag, TagCount, TagDistribution, TagInput, User};
use moodtrack::repository::{
    list, run_in_transaction, DaylogQuery, Filters, TagRepository, DAYLOG_SORT_SAFELIST, TAG_SORT_SAFELIST,
};
use moodtrack::service::Services;
use moodtrack::{apply_migrations, ensure_database_exists, rewrite, AppError, MapError, Params};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    ensure_database_exists(&url).await.unwrap();
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
    apply_migrations(&pool).await.unwrap();
    Some(pool)
}

async fn active_user(services: &Services) -> User {
    let suffix = Uuid::new_v4().simple().to_string();
    let registered = services
        .users
        .register(NewUser {
            name: "Tester".into(),
            email: format!("{suffix}@example.com"),
            phone: suffix.clone(),
            password_hash: vec![7; 60],
        })
        .await
        .unwrap();
    assert!(!registered.activated);
    services.users.activate(&registered.email, registered.cod).await.unwrap()
}

fn daylog(date: (i32, u32, u32), mood: MoodLabel, tags: &[&str]) -> DaylogInput {
    described(date, mood, tags, "walked the dog")
}

fn described(date: (i32, u32, u32), mood: MoodLabel, tags: &[&str], description: &str) -> DaylogInput {
    DaylogInput {
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        description: description.into(),
        mood_label: Some(mood),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn page(sort: &str, safelist: &'static [&'static str]) -> Filters {
    Filters {
        page: 1,
        page_size: 20,
        sort: sort.into(),
        sort_safelist: safelist,
    }
}

#[tokio::test]
async fn empty_list_has_zero_metadata() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let (logs, meta) = services
        .daylogs
        .list(user.id, &Default::default(), &page("-date", DAYLOG_SORT_SAFELIST))
        .await
        .unwrap();
    assert!(logs.is_empty());
    assert_eq!(meta, Default::default());
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let err = services.daylogs.get(Uuid::new_v4(), user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref what) if what == "daylog"), "{err}");
    let err = services.tags.delete(Uuid::new_v4(), user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn create_update_and_stale_version() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let log = services
        .daylogs
        .create(user.id, daylog((2024, 3, 9), MoodLabel::Good, &["work", "gym"]))
        .await
        .unwrap();
    assert_eq!(log.tags, vec!["gym".to_string(), "work".to_string()]);
    assert_eq!(log.base.version, 1);

    let patch = DaylogPatch {
        version: log.base.version,
        mood_label: Some(MoodLabel::Bad),
        tags: Some(vec!["sleep".into()]),
        ..Default::default()
    };
    let updated = services.daylogs.update(log.id, user.id, patch).await.unwrap();
    assert_eq!(updated.mood_label, MoodLabel::Bad);
    assert_eq!(updated.tags, vec!["sleep".to_string()]);
    assert_eq!(updated.base.version, 2);
    assert!(updated.base.updated_at.is_some());

    let stale = DaylogPatch {
        version: log.base.version,
        description: Some("again".into()),
        ..Default::default()
    };
    let err = services.daylogs.update(log.id, user.id, stale).await.unwrap_err();
    assert!(matches!(err, AppError::EditConflict), "{err}");
}

#[tokio::test]
async fn soft_deleted_log_disappears() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let log = services
        .daylogs
        .create(user.id, daylog((2024, 5, 1), MoodLabel::Neutral, &["rain"]))
        .await
        .unwrap();
    services.daylogs.delete(log.id, user.id).await.unwrap();

    assert!(matches!(
        services.daylogs.get(log.id, user.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(services.daylogs.list_by_year(user.id, 2024).await.unwrap().is_empty());
    let err = services.daylogs.delete(log.id, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn tag_last_log_is_a_nullable_nested_entity() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let unused = services
        .tags
        .create(user.id, TagInput { name: "reading".into(), version: None })
        .await
        .unwrap();
    let log = services
        .daylogs
        .create(user.id, daylog((2024, 6, 2), MoodLabel::Good, &["running"]))
        .await
        .unwrap();

    let (tags, meta) = services.tags.list(user.id, &page("name", TAG_SORT_SAFELIST)).await.unwrap();
    assert_eq!(meta.total_records, 2);
    let by_name = |name: &str| tags.iter().find(|t| t.name == name).unwrap().clone();

    assert_eq!(by_name("reading").id, unused.id);
    assert_eq!(by_name("reading").last_log, None);
    let last = by_name("running").last_log.expect("running was used by a log");
    assert_eq!(last.id, log.id);
    assert_eq!(last.mood_label, MoodLabel::Good);
}

#[tokio::test]
async fn duplicate_tag_name_already_exists() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let input = TagInput { name: "Coffee".into(), version: None };
    services.tags.create(user.id, input.clone()).await.unwrap();
    let err = services
        .tags
        .create(user.id, TagInput { name: "coffee".into(), version: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists { field: "name" }), "{err}");
}

#[tokio::test]
async fn monthly_report_counts_moods() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    for (day, mood) in [(1, MoodLabel::Good), (2, MoodLabel::Good), (3, MoodLabel::Bad)] {
        services
            .daylogs
            .create(user.id, daylog((2023, 11, day), mood, &["work"]))
            .await
            .unwrap();
    }

    let report = services.reports.monthly(user.id, 2023, 11).await.unwrap();
    let good = report
        .distribution
        .iter()
        .find(|d| d.mood_label == MoodLabel::Good)
        .unwrap();
    assert_eq!(good.count, 2);
    assert!((good.percentage - 66.67).abs() < 0.01, "{}", good.percentage);
    assert_eq!(
        report.tags,
        vec![TagCount { tag: "work".into(), count: 3 }]
    );

    let err = services.reports.monthly(user.id, 2023, 13).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidData(_)));
}

#[tokio::test]
async fn row_wider_than_entity_is_a_bind_error() {
    let Some(pool) = pool().await else { return };

    let q = rewrite(
        "SELECT :tag::text AS tag, 1::int8 AS count, 2 AS extra",
        &Params::new().set("tag", "x"),
    )
    .unwrap();
    let err = list::<TagCount, _>(&pool, &q, TIMEOUT).await.unwrap_err();
    assert!(
        matches!(err, AppError::Map(MapError::Bind { columns: 3, expected: 2, .. })),
        "{err}"
    );

    let q = rewrite("SELECT 'x'::text AS tag, 4::int8 AS count", &Params::new()).unwrap();
    let rows = list::<TagCount, _>(&pool, &q, TIMEOUT).await.unwrap();
    assert_eq!(rows, vec![TagCount { tag: "x".into(), count: 4 }]);
}

/// Three January entries: work/GOOD, gym/BAD, work/NEUTRAL.
async fn january(services: &Services, user_id: Uuid) {
    let entries = [
        described((2024, 1, 5), MoodLabel::Good, &["work"], "long meeting at the office"),
        described((2024, 1, 7), MoodLabel::Bad, &["gym"], "sore legs"),
        described((2024, 1, 9), MoodLabel::Neutral, &["work"], "quiet office day"),
    ];
    for input in entries {
        services.daylogs.create(user_id, input).await.unwrap();
    }
}

#[tokio::test]
async fn daylog_list_filters() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;
    january(&services, user.id).await;

    let user_id = user.id;
    let dates = |query: DaylogQuery| {
        let services = services.clone();
        async move {
            let (logs, meta) = services
                .daylogs
                .list(user_id, &query, &page("-date", DAYLOG_SORT_SAFELIST))
                .await
                .unwrap();
            assert_eq!(meta.total_records, logs.len() as i64);
            logs.into_iter().map(|l| l.date).collect::<Vec<_>>()
        }
    };

    assert_eq!(dates(DaylogQuery::default()).await, vec![day(9), day(7), day(5)]);
    assert_eq!(
        dates(DaylogQuery { tag: "WORK".into(), ..Default::default() }).await,
        vec![day(9), day(5)]
    );
    assert_eq!(
        dates(DaylogQuery { mood: Some(MoodLabel::Bad), ..Default::default() }).await,
        vec![day(7)]
    );
    assert_eq!(
        dates(DaylogQuery { from: Some(day(6)), ..Default::default() }).await,
        vec![day(9), day(7)]
    );
    assert_eq!(
        dates(DaylogQuery { description: "office".into(), ..Default::default() }).await,
        vec![day(9), day(5)]
    );
    assert_eq!(
        dates(DaylogQuery {
            tag: "work".into(),
            mood: Some(MoodLabel::Good),
            ..Default::default()
        })
        .await,
        vec![day(5)]
    );
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_zero_metadata() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;
    january(&services, user.id).await;

    let filters = Filters {
        page: 5,
        ..page("-date", DAYLOG_SORT_SAFELIST)
    };
    let (logs, meta) = services
        .daylogs
        .list(user.id, &DaylogQuery::default(), &filters)
        .await
        .unwrap();
    assert!(logs.is_empty());
    assert_eq!(meta, Default::default());
}

#[tokio::test]
async fn list_by_year_rejects_years_out_of_range() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let err = services.daylogs.list_by_year(user.id, i32::MAX).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidData(_)), "{err}");
}

#[tokio::test]
async fn tag_and_mood_reports() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;
    january(&services, user.id).await;

    let report = services.reports.by_tag(user.id, "WORK").await.unwrap();
    assert_eq!(report.tag, "WORK");
    let moods: Vec<(MoodLabel, i64)> = report.distribution.iter().map(|d| (d.mood_label, d.count)).collect();
    assert_eq!(moods, vec![(MoodLabel::Neutral, 1), (MoodLabel::Good, 1)]);
    assert!(report.distribution.iter().all(|d| d.percentage == 50.0));

    let report = services.reports.by_mood(user.id, MoodLabel::Good).await.unwrap();
    assert_eq!(
        report.distribution,
        vec![TagDistribution { tag: "work".into(), count: 1, percentage: 100.0 }]
    );

    let report = services.reports.by_tag(user.id, "unused").await.unwrap();
    assert!(report.distribution.is_empty());
}

#[tokio::test]
async fn array_column_into_scalar_field_is_unsupported() {
    let Some(pool) = pool().await else { return };

    let q = rewrite("SELECT ARRAY['a', 'b']::text[] AS tag, 1::int8 AS count", &Params::new()).unwrap();
    let err = list::<TagCount, _>(&pool, &q, TIMEOUT).await.unwrap_err();
    match err {
        AppError::Map(MapError::UnsupportedScanType { column, sql_type }) => {
            assert_eq!(column, "tag");
            assert_eq!(sql_type, "TEXT[]");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_unit_of_work_leaves_no_rows() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool.clone(), TIMEOUT);
    let user = active_user(&services).await;

    let repo = TagRepository::new(TIMEOUT);
    let mut tag = Tag {
        name: "ephemeral".into(),
        user_id: user.id,
        ..Tag::default()
    };
    let err = run_in_transaction(&pool, TIMEOUT, move |tx| {
        Box::pin(async move {
            repo.insert(&mut **tx, &mut tag).await?;
            assert_ne!(tag.id, Uuid::nil());
            Err::<(), _>(AppError::EditConflict)
        })
    })
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EditConflict));

    let (tags, _) = services.tags.list(user.id, &page("name", TAG_SORT_SAFELIST)).await.unwrap();
    assert!(tags.is_empty());
}

#[tokio::test]
async fn deleted_account_can_no_longer_authenticate() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    assert_eq!(services.users.authenticate(user.id).await.unwrap().id, user.id);
    services.users.delete(user.id).await.unwrap();
    assert!(matches!(
        services.users.authenticate(user.id).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(services.users.delete(user.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn duplicate_email_registration_already_exists() {
    let Some(pool) = pool().await else { return };
    let services = Services::new(pool, TIMEOUT);
    let user = active_user(&services).await;

    let err = services
        .users
        .register(NewUser {
            name: "Twin".into(),
            email: user.email.to_uppercase(),
            phone: Uuid::new_v4().simple().to_string(),
            password_hash: vec![7; 60],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists { field: "email" }), "{err}");
}
