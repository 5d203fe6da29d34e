use radio_scheduler::{
    config::SeedConfig,
    database::Database,
    seed::seed_sample_data,
    services::SqliteRadioProgramService,
};

#[tokio::test]
async fn seeding_fills_an_empty_database_once() {
    let database = Database::in_memory().await.unwrap();
    let config = SeedConfig {
        enabled: true,
        rng_seed: Some(7),
    };

    let summary = seed_sample_data(&database, &config).await.unwrap();

    assert!((5..15).contains(&summary.hosts));
    assert!((50..135).contains(&summary.musics));
    assert!((15..35).contains(&summary.program_details));
    assert!((5..20).contains(&summary.radio_programs));

    let service = SqliteRadioProgramService::from_database(&database);
    let programs = service.get_all_programs().await.unwrap();
    assert_eq!(programs.len(), summary.radio_programs);
    for program in &programs {
        assert!((1..=5).contains(&program.musics.len()));
        assert!(program.start_time <= program.end_time);
    }

    let details: std::collections::HashSet<i64> =
        programs.iter().map(|p| p.program_details_id).collect();
    assert_eq!(details.len(), programs.len());

    let second = seed_sample_data(&database, &config).await.unwrap();
    assert!(second.is_empty());
}
