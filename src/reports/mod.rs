//! Read-side analytics reports
//!
//! Two reports over the hiring tables, computed from full-table scans with
//! inner-join semantics: rows whose foreign ids have no match, or whose
//! hire datetime is null or unparseable, are skipped.
//!
//! The store seam is deliberately narrow (insert/scan/truncate), so these
//! are computed in the service rather than pushed down as SQL.

mod errors;

pub use errors::{ReportError, ReportResult};

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::store::{SqlConnection, SqlValue};
use crate::validate::parse_iso_datetime;

use chrono::Datelike;

/// Hires for one (department, job) pair split by calendar quarter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterBreakdown {
    pub department: String,
    pub job: String,
    #[serde(rename = "Q1")]
    pub q1: i64,
    #[serde(rename = "Q2")]
    pub q2: i64,
    #[serde(rename = "Q3")]
    pub q3: i64,
    #[serde(rename = "Q4")]
    pub q4: i64,
}

/// One department that hired above the cross-department mean
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentHires {
    pub id: i64,
    pub department: String,
    pub hired: i64,
}

/// Hires per (department, job) per quarter of `year`, ordered by department
/// then job.
pub fn employees_by_quarter(
    conn: &mut dyn SqlConnection,
    year: i32,
) -> ReportResult<Vec<QuarterBreakdown>> {
    let departments = name_index(conn, "departments", "department")?;
    let jobs = name_index(conn, "jobs", "job")?;

    let mut buckets: BTreeMap<(String, String), [i64; 4]> = BTreeMap::new();

    for hire in hires_in_year(conn, year)? {
        let department = match departments.get(&hire.department_id) {
            Some(name) => name.clone(),
            None => continue,
        };
        let job = match jobs.get(&hire.job_id) {
            Some(name) => name.clone(),
            None => continue,
        };

        let counts = buckets.entry((department, job)).or_insert([0; 4]);
        counts[hire.quarter] += 1;
    }

    Ok(buckets
        .into_iter()
        .map(|((department, job), q)| QuarterBreakdown {
            department,
            job,
            q1: q[0],
            q2: q[1],
            q3: q[2],
            q4: q[3],
        })
        .collect())
}

/// Departments whose hire count in `year` exceeds the mean across all
/// departments that hired, ordered by count descending.
pub fn departments_above_mean(
    conn: &mut dyn SqlConnection,
    year: i32,
) -> ReportResult<Vec<DepartmentHires>> {
    let departments = name_index(conn, "departments", "department")?;

    let mut counts: HashMap<i64, i64> = HashMap::new();
    for hire in hires_in_year(conn, year)? {
        if departments.contains_key(&hire.department_id) {
            *counts.entry(hire.department_id).or_insert(0) += 1;
        }
    }

    if counts.is_empty() {
        return Ok(Vec::new());
    }

    let total: i64 = counts.values().sum();
    let mean = total as f64 / counts.len() as f64;

    let mut above: Vec<DepartmentHires> = counts
        .into_iter()
        .filter(|(_, hired)| (*hired as f64) > mean)
        .filter_map(|(id, hired)| {
            departments.get(&id).map(|department| DepartmentHires {
                id,
                department: department.clone(),
                hired,
            })
        })
        .collect();

    above.sort_by(|a, b| b.hired.cmp(&a.hired).then_with(|| a.id.cmp(&b.id)));
    Ok(above)
}

struct Hire {
    department_id: i64,
    job_id: i64,
    /// 0-based quarter index
    quarter: usize,
}

/// Scan hired_employees and keep rows hired in `year` with usable ids
fn hires_in_year(conn: &mut dyn SqlConnection, year: i32) -> ReportResult<Vec<Hire>> {
    let mut hires = Vec::new();

    for row in conn.scan_table("hired_employees")? {
        let hired_at = match row.get("datetime") {
            Some(SqlValue::Text(text)) => match parse_iso_datetime(text) {
                Some(dt) => dt,
                None => continue,
            },
            Some(SqlValue::Timestamp(ts)) => ts.naive_utc(),
            _ => continue,
        };
        if hired_at.year() != year {
            continue;
        }

        let department_id = match row.get("department_id") {
            Some(SqlValue::Int(id)) => *id,
            _ => continue,
        };
        let job_id = match row.get("job_id") {
            Some(SqlValue::Int(id)) => *id,
            _ => continue,
        };

        hires.push(Hire {
            department_id,
            job_id,
            quarter: (hired_at.month() as usize - 1) / 3,
        });
    }

    Ok(hires)
}

/// Scan an id→name lookup table
fn name_index(
    conn: &mut dyn SqlConnection,
    table: &str,
    name_column: &str,
) -> ReportResult<HashMap<i64, String>> {
    let mut index = HashMap::new();

    for row in conn.scan_table(table)? {
        let id = match row.get("id") {
            Some(SqlValue::Int(id)) => *id,
            _ => continue,
        };
        if let Some(SqlValue::Text(name)) = row.get(name_column) {
            index.insert(id, name.clone());
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use crate::store::{InMemoryStore, SqlConnector};

    fn seeded_store() -> InMemoryStore {
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.provision(&registry);

        store
            .seed_row(
                "departments",
                vec![SqlValue::Int(1), SqlValue::Text("Engineering".into())],
            )
            .unwrap();
        store
            .seed_row(
                "departments",
                vec![SqlValue::Int(2), SqlValue::Text("Sales".into())],
            )
            .unwrap();
        store
            .seed_row("jobs", vec![SqlValue::Int(1), SqlValue::Text("Developer".into())])
            .unwrap();
        store
            .seed_row("jobs", vec![SqlValue::Int(2), SqlValue::Text("Manager".into())])
            .unwrap();

        let hires = [
            ("2021-01-15T09:00:00Z", 1, 1),
            ("2021-02-10T09:00:00Z", 1, 1),
            ("2021-05-20T09:00:00Z", 1, 2),
            ("2021-11-01T09:00:00Z", 2, 2),
            ("2020-03-01T09:00:00Z", 2, 2), // wrong year
        ];
        for (i, (dt, dep, job)) in hires.iter().enumerate() {
            store
                .seed_row(
                    "hired_employees",
                    vec![
                        SqlValue::Int(i as i64 + 1),
                        SqlValue::Text(format!("emp{}", i)),
                        SqlValue::Text((*dt).into()),
                        SqlValue::Int(*dep),
                        SqlValue::Int(*job),
                    ],
                )
                .unwrap();
        }

        store
    }

    #[test]
    fn test_quarter_breakdown() {
        let store = seeded_store();
        let mut conn = store.connect().unwrap();

        let rows = employees_by_quarter(conn.as_mut(), 2021).unwrap();

        assert_eq!(rows.len(), 3);
        // Ordered by department, then job
        assert_eq!(rows[0].department, "Engineering");
        assert_eq!(rows[0].job, "Developer");
        assert_eq!((rows[0].q1, rows[0].q2, rows[0].q3, rows[0].q4), (2, 0, 0, 0));

        assert_eq!(rows[1].job, "Manager");
        assert_eq!(rows[1].q2, 1);

        assert_eq!(rows[2].department, "Sales");
        assert_eq!(rows[2].q4, 1);
    }

    #[test]
    fn test_quarter_breakdown_skips_unjoinable_rows() {
        let store = seeded_store();
        // Dangling department id and a null datetime
        store
            .seed_row(
                "hired_employees",
                vec![
                    SqlValue::Int(90),
                    SqlValue::Text("ghost".into()),
                    SqlValue::Text("2021-06-01T09:00:00Z".into()),
                    SqlValue::Int(99),
                    SqlValue::Int(1),
                ],
            )
            .unwrap();
        store
            .seed_row(
                "hired_employees",
                vec![
                    SqlValue::Int(91),
                    SqlValue::Text("undated".into()),
                    SqlValue::Null,
                    SqlValue::Int(1),
                    SqlValue::Int(1),
                ],
            )
            .unwrap();

        let mut conn = store.connect().unwrap();
        let rows = employees_by_quarter(conn.as_mut(), 2021).unwrap();
        let total: i64 = rows.iter().map(|r| r.q1 + r.q2 + r.q3 + r.q4).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_departments_above_mean() {
        let store = seeded_store();
        let mut conn = store.connect().unwrap();

        // Engineering hired 3, Sales 1; mean is 2
        let rows = departments_above_mean(conn.as_mut(), 2021).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department, "Engineering");
        assert_eq!(rows[0].hired, 3);
    }

    #[test]
    fn test_no_hires_yields_empty_report() {
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.provision(&registry);

        let mut conn = store.connect().unwrap();
        assert!(departments_above_mean(conn.as_mut(), 2021).unwrap().is_empty());
        assert!(employees_by_quarter(conn.as_mut(), 2021).unwrap().is_empty());
    }
}
