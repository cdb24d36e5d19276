// src/query/mod.rs

pub mod batch;
pub mod run;

pub use batch::{empty_batch, rows_to_batch};
pub use run::{execute, run_all, run_report, ReportResult};

/// One named analytical query over the raw tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub name: &'static str,
    pub sql: &'static str,
}

/// The eight business reports, in export order.
pub fn catalog() -> &'static [Report] {
    &CATALOG
}

#[cfg(test)]
fn find(name: &str) -> Option<&'static Report> {
    CATALOG.iter().find(|r| r.name == name)
}

static CATALOG: [Report; 8] = [
    Report {
        name: "Q1_Top_10_Longest_Rides",
        sql: "
            SELECT r.ride_id, r.distance_km, d.name AS driver_name, ri.name AS rider_name,
                   r.pickup_city, r.dropoff_city, p.method AS payment_method
            FROM rides_raw r
            LEFT JOIN drivers_raw d ON d.driver_id = r.driver_id
            LEFT JOIN riders_raw ri ON ri.rider_id = r.rider_id
            LEFT JOIN payments_raw p ON p.ride_id = r.ride_id
            WHERE p.amount > 0
            ORDER BY r.distance_km DESC
            LIMIT 10;
        ",
    },
    Report {
        name: "Q2_Active_Riders_2021_to_2024",
        sql: "
            SELECT COUNT(DISTINCT r1.rider_id) AS riders_2021_still_active_2024
            FROM riders_raw r1
            JOIN rides_raw r2 ON r1.rider_id = r2.rider_id
            WHERE CAST(substr(r1.signup_date, 1, 4) AS INT) = 2021
              AND substr(r2.pickup_time, 1, 4) = '2024';
        ",
    },
    Report {
        name: "Q3_Quarterly_Revenue",
        sql: "
            SELECT
              substr(p.paid_date, 1, 4) AS year,
              CASE
                WHEN substr(p.paid_date, 6, 2) IN ('01', '02', '03') THEN 'Q1'
                WHEN substr(p.paid_date, 6, 2) IN ('04', '05', '06') THEN 'Q2'
                WHEN substr(p.paid_date, 6, 2) IN ('07', '08', '09') THEN 'Q3'
                ELSE 'Q4'
              END AS quarter,
              SUM(p.amount) AS revenue
            FROM payments_raw p
            WHERE p.amount > 0
            GROUP BY year, quarter
            ORDER BY year, quarter;
        ",
    },
    Report {
        name: "Q4_Top_5_Consistent_Drivers",
        sql: "
            WITH monthly AS (
              SELECT driver_id,
                     substr(pickup_time, 1, 7) AS month,
                     COUNT(DISTINCT ride_id) AS rides_in_month
              FROM rides_raw
              WHERE pickup_time BETWEEN '2021-06-01' AND '2024-12-31'
              GROUP BY driver_id, month
            )
            SELECT d.name AS driver_name,
                   SUM(m.rides_in_month) AS total_rides,
                   COUNT(m.month) AS active_months,
                   ROUND(SUM(m.rides_in_month) * 1.0 / COUNT(m.month), 2) AS avg_monthly_rides
            FROM monthly m
            LEFT JOIN drivers_raw d ON d.driver_id = m.driver_id
            GROUP BY m.driver_id
            ORDER BY avg_monthly_rides DESC
            LIMIT 5;
        ",
    },
    Report {
        name: "Q5_Cancellation_Rate_Per_City",
        sql: "
            WITH requests AS (
              SELECT pickup_city, COUNT(DISTINCT ride_id) AS requests
              FROM rides_raw
              GROUP BY pickup_city
            ),
            cancels AS (
              SELECT pickup_city, COUNT(DISTINCT ride_id) AS cancelled
              FROM rides_raw
              WHERE LOWER(status) = 'cancelled'
              GROUP BY pickup_city
            )
            SELECT r.pickup_city,
                   COALESCE(c.cancelled, 0) AS cancelled,
                   r.requests,
                   ROUND(COALESCE(c.cancelled, 0) * 1.0 / r.requests, 3) AS cancellation_rate
            FROM requests r
            LEFT JOIN cancels c ON r.pickup_city = c.pickup_city
            ORDER BY cancellation_rate DESC;
        ",
    },
    Report {
        name: "Q6_Riders_With_10Plus_Rides_No_Cash",
        sql: "
            WITH rides_count AS (
              SELECT rider_id, COUNT(DISTINCT ride_id) AS rides_count
              FROM rides_raw
              GROUP BY rider_id
            ),
            cash_users AS (
              SELECT DISTINCT r.rider_id
              FROM rides_raw r
              JOIN payments_raw p ON p.ride_id = r.ride_id
              WHERE LOWER(p.method) = 'cash'
            )
            SELECT ri.name AS rider_name, rc.rides_count
            FROM rides_count rc
            JOIN riders_raw ri ON rc.rider_id = ri.rider_id
            LEFT JOIN cash_users cu ON rc.rider_id = cu.rider_id
            WHERE rc.rides_count > 10 AND cu.rider_id IS NULL
            ORDER BY rc.rides_count DESC;
        ",
    },
    Report {
        name: "Q7_Top_3_Drivers_Per_City_By_Revenue",
        sql: "
            WITH rev AS (
              SELECT r.pickup_city, r.driver_id, SUM(p.amount) AS revenue
              FROM rides_raw r
              JOIN payments_raw p ON r.ride_id = p.ride_id
              WHERE p.amount > 0
              GROUP BY r.pickup_city, r.driver_id
            ),
            ranked AS (
              SELECT pickup_city, driver_id, revenue,
                     ROW_NUMBER() OVER (
                       PARTITION BY pickup_city
                       ORDER BY revenue DESC, driver_id ASC
                     ) AS rnk
              FROM rev
            )
            SELECT rk.pickup_city, rk.driver_id, d.name AS driver_name, rk.revenue
            FROM ranked rk
            JOIN drivers_raw d ON d.driver_id = rk.driver_id
            WHERE rk.rnk <= 3
            ORDER BY rk.pickup_city, rk.rnk;
        ",
    },
    Report {
        name: "Q8_Bonus_Qualified_Drivers",
        sql: "
            WITH completed AS (
              SELECT driver_id, COUNT(DISTINCT ride_id) AS completed_rides
              FROM rides_raw
              WHERE ride_id IN (SELECT ride_id FROM payments_raw WHERE amount > 0)
              GROUP BY driver_id
            ),
            cancelled AS (
              SELECT driver_id,
                     COUNT(CASE WHEN LOWER(status) = 'cancelled' THEN 1 END) AS cancelled,
                     COUNT(*) AS total
              FROM rides_raw
              GROUP BY driver_id
            )
            SELECT d.name AS driver_name,
                   c.completed_rides,
                   d.rating,
                   ROUND(COALESCE(can.cancelled, 0) * 1.0 / COALESCE(can.total, 1), 3) AS cancel_rate
            FROM completed c
            JOIN drivers_raw d ON d.driver_id = c.driver_id
            LEFT JOIN cancelled can ON can.driver_id = c.driver_id
            WHERE c.completed_rides >= 30
              AND d.rating >= 4.5
              AND ROUND(COALESCE(can.cancelled, 0) * 1.0 / COALESCE(can.total, 1), 3) < 0.05
            ORDER BY c.completed_rides DESC, d.rating DESC
            LIMIT 10;
        ",
    },
];
