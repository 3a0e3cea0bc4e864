//! Generated accessor for `TelemetryFrame`.
//!
//! Auto-generated from a BitSchema definition. Do not edit manually.
//!
//! Fields (38 bits total):
//!   active: bool, bits 0:0
//!   temperature: i64 (-40 to 87), bits 1:7
//!   mode: String (values: idle, active, maintenance), bits 8:9
//!   firmware: String (values: v1), constant
//!   sampled_on: NaiveDate (2024-01-01..2024-12-31, day), bits 10:18
//!   window: NaiveDateTime (2024-01-01T00:00:00..2024-01-08T00:00:00, hour), bits 19:26
//!   sensors: BTreeMap<String, bool> (flags: gps, imu, baro), bits 27:30
//!   label: Option<String> (values: alpha, beta, gamma...), bits 31:33
//!   retries: Option<i64> (0 to 7), bits 34:37

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub active: bool,
    pub temperature: i64,
    pub mode: String,
    pub firmware: String,
    pub sampled_on: NaiveDate,
    pub window: NaiveDateTime,
    pub sensors: BTreeMap<String, bool>,
    pub label: Option<String>,
    pub retries: Option<i64>,
}

impl TelemetryFrame {
    /// Packs this record into its 64-bit word.
    pub fn encode(&self) -> u64 {
        let mut word: u64 = 0;

        // active: offset 0, bits 1
        let normalized = u64::from(self.active);
        word |= normalized & 0x1;

        // temperature: offset 1, bits 7
        let normalized = self.temperature.wrapping_sub(-40) as u64;
        word |= (normalized & 0x7f) << 1;

        // mode: offset 8, bits 2
        let normalized = ["idle", "active", "maintenance"].iter().position(|v| *v == self.mode).expect("mode: value not in enum") as u64;
        word |= (normalized & 0x3) << 8;

        // firmware: constant, no storage

        // sampled_on: offset 10, bits 9
        let min_date = "2024-01-01".parse::<NaiveDate>().unwrap();
        let normalized = (self.sampled_on - min_date).num_days() as u64;
        word |= (normalized & 0x1ff) << 10;

        // window: offset 19, bits 8
        let min_date = "2024-01-01T00:00:00".parse::<NaiveDateTime>().unwrap();
        let normalized = (self.window - min_date).num_hours() as u64;
        word |= (normalized & 0xff) << 19;

        // sensors: offset 27, bits 4
        let mut normalized: u64 = 0;
        for (flag, position) in [("gps", 0u32), ("imu", 1u32), ("baro", 3u32)] {
            if self.sensors.get(flag).copied().unwrap_or(false) {
                normalized |= 1 << position;
            }
        }
        word |= (normalized & 0xf) << 27;

        // label: offset 31, bits 3
        if let Some(value) = &self.label {
            word |= 1 << 31;
            let normalized = ["alpha", "beta", "gamma", "delta"].iter().position(|v| *v == value.as_str()).expect("label: value not in enum") as u64;
            word |= (normalized & 0x3) << 32;
        }

        // retries: offset 34, bits 4
        if let Some(value) = self.retries {
            word |= 1 << 34;
            let normalized = value as u64;
            word |= (normalized & 0x7) << 35;
        }

        word
    }

    /// Unpacks a 64-bit word into a record.
    pub fn decode(word: u64) -> Self {
        // active: offset 0, bits 1
        let active = (word & 0x1) != 0;

        // temperature: offset 1, bits 7
        let temperature = (((word >> 1) & 0x7f) as i64).wrapping_add(-40);

        // mode: offset 8, bits 2
        let mode = ["idle", "active", "maintenance"][(((word >> 8) & 0x3) as usize).min(2)].to_string();

        // firmware: constant, no storage
        let firmware = "v1".to_string();

        // sampled_on: offset 10, bits 9
        let min_date = "2024-01-01".parse::<NaiveDate>().unwrap();
        let sampled_on = min_date + Duration::days(((word >> 10) & 0x1ff) as i64);

        // window: offset 19, bits 8
        let min_date = "2024-01-01T00:00:00".parse::<NaiveDateTime>().unwrap();
        let window = min_date + Duration::hours(((word >> 19) & 0xff) as i64);

        // sensors: offset 27, bits 4
        let extracted = (word >> 27) & 0xf;
        let mut flags = BTreeMap::new();
        for (flag, position) in [("gps", 0u32), ("imu", 1u32), ("baro", 3u32)] {
            flags.insert(flag.to_string(), ((extracted >> position) & 1) == 1);
        }
        let sensors = flags;

        // label: offset 31, bits 3
        let label = if ((word >> 31) & 1) == 0 {
            None
        } else {
            Some(["alpha", "beta", "gamma", "delta"][((word >> 32) & 0x3) as usize].to_string())
        };

        // retries: offset 34, bits 4
        let retries = if ((word >> 34) & 1) == 0 {
            None
        } else {
            Some(((word >> 35) & 0x7) as i64)
        };

        Self {
            active,
            temperature,
            mode,
            firmware,
            sampled_on,
            window,
            sensors,
            label,
            retries,
        }
    }
}
