//! Meet log repository
//!
//! Competition results for each athlete, plus the derived progress
//! series the charts consume. One row per meet; upcoming meets carry
//! zeroed lifts until results are logged.

use chrono::{NaiveDate, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{
  AthleteStats, MeetEntry, MeetEntryUpdate, MeetPerformance, NewMeetEntry,
};

#[derive(Debug, Error)]
pub enum MeetLogError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
  #[error("Meet not found")]
  NotFound,
  #[error("Invalid stored value: {0}")]
  Decode(String),
}

#[derive(sqlx::FromRow)]
struct MeetRow {
  id: String,
  athlete_id: String,
  meet_name: String,
  meet_date: NaiveDate,
  federation: Option<String>,
  weight_class: String,
  bodyweight: f64,
  equipment: String,
  actual_squat: f64,
  actual_bench: f64,
  actual_deadlift: f64,
  actual_total: f64,
  wilks_score: Option<f64>,
  predicted_total: Option<f64>,
  delta: Option<f64>,
  placement: Option<i64>,
  notes: Option<String>,
  created_at: chrono::DateTime<Utc>,
  updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<MeetRow> for MeetEntry {
  type Error = MeetLogError;

  fn try_from(row: MeetRow) -> Result<Self, Self::Error> {
    let equipment = row.equipment.parse().map_err(MeetLogError::Decode)?;

    Ok(MeetEntry {
      id: row.id,
      athlete_id: row.athlete_id,
      meet_name: row.meet_name,
      meet_date: row.meet_date,
      federation: row.federation,
      weight_class: row.weight_class,
      bodyweight: row.bodyweight,
      equipment,
      actual_squat: row.actual_squat,
      actual_bench: row.actual_bench,
      actual_deadlift: row.actual_deadlift,
      actual_total: row.actual_total,
      wilks_score: row.wilks_score,
      predicted_total: row.predicted_total,
      delta: row.delta,
      placement: row.placement,
      notes: row.notes,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Clone)]
pub struct MeetLog {
  db: DbPool,
}

impl MeetLog {
  pub fn new(db: DbPool) -> Self {
    Self { db }
  }

  /// Every meet for an athlete, most recent first.
  pub async fn meets_for_athlete(&self, athlete_id: &str) -> Result<Vec<MeetEntry>, MeetLogError> {
    let rows: Vec<MeetRow> =
      sqlx::query_as("SELECT * FROM meets WHERE athlete_id = ? ORDER BY meet_date DESC")
        .bind(athlete_id)
        .fetch_all(&self.db)
        .await?;

    debug!("Retrieved {} meets for {}", rows.len(), athlete_id);
    rows.into_iter().map(MeetEntry::try_from).collect()
  }

  /// Meets on or after a date, soonest first.
  pub async fn upcoming_meets(
    &self,
    athlete_id: &str,
    from: NaiveDate,
  ) -> Result<Vec<MeetEntry>, MeetLogError> {
    let rows: Vec<MeetRow> = sqlx::query_as(
      "SELECT * FROM meets WHERE athlete_id = ? AND meet_date >= ? ORDER BY meet_date ASC",
    )
    .bind(athlete_id)
    .bind(from)
    .fetch_all(&self.db)
    .await?;

    rows.into_iter().map(MeetEntry::try_from).collect()
  }

  pub async fn add_meet(&self, meet: NewMeetEntry) -> Result<MeetEntry, MeetLogError> {
    let id = format!("meet-{}", Uuid::new_v4());
    let now = Utc::now();

    sqlx::query(
      r#"
      INSERT INTO meets (
        id, athlete_id, meet_name, meet_date, federation, weight_class,
        bodyweight, equipment, actual_squat, actual_bench, actual_deadlift,
        actual_total, wilks_score, predicted_total, delta, placement, notes,
        created_at, updated_at
      )
      VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
      "#,
    )
    .bind(&id)
    .bind(&meet.athlete_id)
    .bind(&meet.meet_name)
    .bind(meet.meet_date)
    .bind(&meet.federation)
    .bind(&meet.weight_class)
    .bind(meet.bodyweight)
    .bind(meet.equipment.to_string())
    .bind(meet.actual_squat)
    .bind(meet.actual_bench)
    .bind(meet.actual_deadlift)
    .bind(meet.actual_total)
    .bind(meet.wilks_score)
    .bind(meet.predicted_total)
    .bind(meet.delta)
    .bind(meet.placement)
    .bind(&meet.notes)
    .bind(now)
    .bind(now)
    .execute(&self.db)
    .await?;

    info!("Meet {} added for {}", id, meet.athlete_id);

    Ok(MeetEntry {
      id,
      athlete_id: meet.athlete_id,
      meet_name: meet.meet_name,
      meet_date: meet.meet_date,
      federation: meet.federation,
      weight_class: meet.weight_class,
      bodyweight: meet.bodyweight,
      equipment: meet.equipment,
      actual_squat: meet.actual_squat,
      actual_bench: meet.actual_bench,
      actual_deadlift: meet.actual_deadlift,
      actual_total: meet.actual_total,
      wilks_score: meet.wilks_score,
      predicted_total: meet.predicted_total,
      delta: meet.delta,
      placement: meet.placement,
      notes: meet.notes,
      created_at: now,
      updated_at: now,
    })
  }

  /// Apply a partial update. `None` fields keep their stored values.
  pub async fn update_meet(
    &self,
    meet_id: &str,
    updates: MeetEntryUpdate,
  ) -> Result<MeetEntry, MeetLogError> {
    let result = sqlx::query(
      r#"
      UPDATE meets SET
        meet_name = COALESCE(?, meet_name),
        meet_date = COALESCE(?, meet_date),
        federation = COALESCE(?, federation),
        weight_class = COALESCE(?, weight_class),
        bodyweight = COALESCE(?, bodyweight),
        equipment = COALESCE(?, equipment),
        actual_squat = COALESCE(?, actual_squat),
        actual_bench = COALESCE(?, actual_bench),
        actual_deadlift = COALESCE(?, actual_deadlift),
        actual_total = COALESCE(?, actual_total),
        wilks_score = COALESCE(?, wilks_score),
        predicted_total = COALESCE(?, predicted_total),
        delta = COALESCE(?, delta),
        placement = COALESCE(?, placement),
        notes = COALESCE(?, notes),
        updated_at = ?
      WHERE id = ?
      "#,
    )
    .bind(&updates.meet_name)
    .bind(updates.meet_date)
    .bind(&updates.federation)
    .bind(&updates.weight_class)
    .bind(updates.bodyweight)
    .bind(updates.equipment.map(|e| e.to_string()))
    .bind(updates.actual_squat)
    .bind(updates.actual_bench)
    .bind(updates.actual_deadlift)
    .bind(updates.actual_total)
    .bind(updates.wilks_score)
    .bind(updates.predicted_total)
    .bind(updates.delta)
    .bind(updates.placement)
    .bind(&updates.notes)
    .bind(Utc::now())
    .bind(meet_id)
    .execute(&self.db)
    .await?;

    if result.rows_affected() == 0 {
      return Err(MeetLogError::NotFound);
    }

    info!("Meet {} updated", meet_id);

    let row: MeetRow = sqlx::query_as("SELECT * FROM meets WHERE id = ?")
      .bind(meet_id)
      .fetch_one(&self.db)
      .await?;
    row.try_into()
  }

  pub async fn delete_meet(&self, meet_id: &str) -> Result<(), MeetLogError> {
    let result = sqlx::query("DELETE FROM meets WHERE id = ?")
      .bind(meet_id)
      .execute(&self.db)
      .await?;

    if result.rows_affected() == 0 {
      return Err(MeetLogError::NotFound);
    }

    info!("Meet {} deleted", meet_id);
    Ok(())
  }

  /// Chart-ready series, in the same most-recent-first order as
  /// [`Self::meets_for_athlete`].
  pub async fn progress_data(
    &self,
    athlete_id: &str,
  ) -> Result<Vec<MeetPerformance>, MeetLogError> {
    let meets = self.meets_for_athlete(athlete_id).await?;

    Ok(
      meets
        .into_iter()
        .map(|meet| MeetPerformance {
          date: meet.meet_date,
          total: meet.actual_total,
          predicted: meet
            .predicted_total
            .unwrap_or(meet.actual_total - meet.delta.unwrap_or(0.0)),
          bodyweight: meet.bodyweight,
          wilks: meet.wilks_score.unwrap_or(0.0),
          equipment: meet.equipment,
        })
        .collect(),
    )
  }

  /// The athlete's highest logged total, as a stats snapshot.
  pub async fn personal_best(
    &self,
    athlete_id: &str,
  ) -> Result<Option<AthleteStats>, MeetLogError> {
    let row: Option<MeetRow> = sqlx::query_as(
      "SELECT * FROM meets WHERE athlete_id = ? ORDER BY actual_total DESC LIMIT 1",
    )
    .bind(athlete_id)
    .fetch_optional(&self.db)
    .await?;

    Ok(row.map(|row| AthleteStats {
      squat: Some(row.actual_squat),
      bench: Some(row.actual_bench),
      deadlift: Some(row.actual_deadlift),
      total: row.actual_total,
      wilks: row.wilks_score,
      date: Some(row.meet_date),
    }))
  }

  /// Install the demo meet history. Safe to call more than once.
  pub async fn seed_demo_data(&self) -> Result<(), MeetLogError> {
    let entries = demo_meets();

    for entry in entries {
      sqlx::query(
        r#"
        INSERT OR IGNORE INTO meets (
          id, athlete_id, meet_name, meet_date, federation, weight_class,
          bodyweight, equipment, actual_squat, actual_bench, actual_deadlift,
          actual_total, wilks_score, predicted_total, delta, placement, notes,
          created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(&entry.id)
      .bind(&entry.athlete_id)
      .bind(&entry.meet_name)
      .bind(entry.meet_date)
      .bind(&entry.federation)
      .bind(&entry.weight_class)
      .bind(entry.bodyweight)
      .bind(entry.equipment.to_string())
      .bind(entry.actual_squat)
      .bind(entry.actual_bench)
      .bind(entry.actual_deadlift)
      .bind(entry.actual_total)
      .bind(entry.wilks_score)
      .bind(entry.predicted_total)
      .bind(entry.delta)
      .bind(entry.placement)
      .bind(&entry.notes)
      .bind(entry.created_at)
      .bind(entry.updated_at)
      .execute(&self.db)
      .await?;
    }

    Ok(())
  }
}

fn demo_meets() -> Vec<MeetEntry> {
  use crate::models::Equipment;

  let entry = |id: &str,
               athlete_id: &str,
               name: &str,
               date: NaiveDate,
               federation: &str,
               weight_class: &str,
               bodyweight: f64,
               equipment: Equipment,
               lifts: (f64, f64, f64, f64),
               wilks: f64,
               predicted: f64,
               delta: f64,
               placement: i64,
               notes: &str,
               logged: chrono::DateTime<Utc>| MeetEntry {
    id: id.to_string(),
    athlete_id: athlete_id.to_string(),
    meet_name: name.to_string(),
    meet_date: date,
    federation: Some(federation.to_string()),
    weight_class: weight_class.to_string(),
    bodyweight,
    equipment,
    actual_squat: lifts.0,
    actual_bench: lifts.1,
    actual_deadlift: lifts.2,
    actual_total: lifts.3,
    wilks_score: Some(wilks),
    predicted_total: Some(predicted),
    delta: Some(delta),
    placement: Some(placement),
    notes: Some(notes.to_string()),
    created_at: logged,
    updated_at: logged,
  };

  vec![
    entry(
      "meet-demo-1",
      "athlete-1",
      "State Championships 2024",
      NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
      "USAPL",
      "69kg",
      68.2,
      Equipment::Raw,
      (160.0, 105.0, 185.0, 450.0),
      298.5,
      445.0,
      5.0,
      2,
      "Great meet! Hit all my openers and got a PR total.",
      Utc.with_ymd_and_hms(2024, 5, 16, 10, 0, 0).unwrap(),
    ),
    entry(
      "meet-demo-2",
      "athlete-1",
      "Local Spring Classic",
      NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
      "Local",
      "69kg",
      69.1,
      Equipment::Raw,
      (155.0, 102.5, 180.0, 437.5),
      289.2,
      440.0,
      -2.5,
      1,
      "First meet of the year, felt rusty but got the win.",
      Utc.with_ymd_and_hms(2024, 3, 11, 14, 30, 0).unwrap(),
    ),
    entry(
      "meet-demo-3",
      "athlete-2",
      "Regional Championships",
      NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
      "USAPL",
      "83kg",
      82.1,
      Equipment::Wraps,
      (220.0, 155.0, 240.0, 615.0),
      378.2,
      590.0,
      25.0,
      1,
      "Exceeded expectations! New competition PR.",
      Utc.with_ymd_and_hms(2024, 4, 21, 9, 15, 0).unwrap(),
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Equipment;
  use crate::test_utils::{mock_new_meet, setup_test_db, teardown_test_db};

  #[tokio::test]
  async fn test_add_and_list_meets_newest_first() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let older = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let newer = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    log.add_meet(mock_new_meet("athlete-1", 430.0, older)).await.unwrap();
    log.add_meet(mock_new_meet("athlete-1", 450.0, newer)).await.unwrap();
    log.add_meet(mock_new_meet("athlete-2", 600.0, newer)).await.unwrap();

    let meets = log.meets_for_athlete("athlete-1").await.unwrap();

    assert_eq!(meets.len(), 2);
    assert_eq!(meets[0].meet_date, newer);
    assert_eq!(meets[1].meet_date, older);
    assert!(meets[0].id.starts_with("meet-"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_meet_patches_only_given_fields() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let created = log.add_meet(mock_new_meet("athlete-1", 440.0, date)).await.unwrap();

    let updated = log
      .update_meet(
        &created.id,
        MeetEntryUpdate {
          placement: Some(1),
          notes: Some("Moved up after review".to_string()),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    assert_eq!(updated.placement, Some(1));
    assert_eq!(updated.notes.as_deref(), Some("Moved up after review"));
    // Untouched fields survive the patch.
    assert_eq!(updated.actual_total, 440.0);
    assert_eq!(updated.meet_name, created.meet_name);
    assert!(updated.updated_at >= created.updated_at);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_missing_meet_is_not_found() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let err = log.update_meet("meet-ghost", MeetEntryUpdate::default()).await.unwrap_err();

    assert!(matches!(err, MeetLogError::NotFound));
    assert_eq!(err.to_string(), "Meet not found");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_delete_meet() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let created = log.add_meet(mock_new_meet("athlete-1", 440.0, date)).await.unwrap();

    log.delete_meet(&created.id).await.unwrap();
    assert!(log.meets_for_athlete("athlete-1").await.unwrap().is_empty());

    let err = log.delete_meet(&created.id).await.unwrap_err();
    assert!(matches!(err, MeetLogError::NotFound));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_progress_data_falls_back_through_delta() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut meet = mock_new_meet("athlete-1", 500.0, date);
    meet.predicted_total = None;
    meet.delta = Some(12.0);
    meet.wilks_score = None;
    log.add_meet(meet).await.unwrap();

    let series = log.progress_data("athlete-1").await.unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].total, 500.0);
    assert_eq!(series[0].predicted, 488.0, "predicted derives from actual - delta");
    assert_eq!(series[0].wilks, 0.0, "missing wilks renders as zero");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_personal_best_picks_highest_total() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    log.add_meet(mock_new_meet("athlete-1", 470.0, d1)).await.unwrap();
    log.add_meet(mock_new_meet("athlete-1", 455.0, d2)).await.unwrap();

    let best = log.personal_best("athlete-1").await.unwrap().unwrap();
    assert_eq!(best.total, 470.0);
    assert_eq!(best.date, Some(d1));

    assert!(log.personal_best("athlete-9").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_demo_data_is_idempotent() {
    let pool = setup_test_db().await;
    let log = MeetLog::new(pool.clone());

    log.seed_demo_data().await.unwrap();
    log.seed_demo_data().await.unwrap();

    let athlete_one = log.meets_for_athlete("athlete-1").await.unwrap();
    let athlete_two = log.meets_for_athlete("athlete-2").await.unwrap();

    assert_eq!(athlete_one.len(), 2);
    assert_eq!(athlete_two.len(), 1);
    assert_eq!(athlete_one[0].meet_name, "State Championships 2024");
    assert_eq!(athlete_two[0].equipment, Equipment::Wraps);

    teardown_test_db(pool).await;
  }
}
