//! Normalization of the capture tool's CSV output into access point and station records.
//!
//! The file holds two sections. The first starts with a `BSSID` header row and lists access
//! points, the second starts with a `Station MAC` header row and lists client stations. Fields are
//! addressed by position, not by header name.

/// First field of the header row that opens the station section.
pub const STATION_MARKER: &str = "Station MAC";
/// First field of the header row that opens the access point section.
pub const AP_HEADER: &str = "BSSID";

const AP_MIN_FIELDS: usize = 4;
const AP_BSSID: usize = 0;
const AP_CHANNEL: usize = 3;
const AP_POWER: usize = 8;
const AP_ESSID: usize = 13;

const STATION_MIN_FIELDS: usize = 6;
const STATION_MAC: usize = 0;
const STATION_POWER: usize = 3;
const STATION_BSSID: usize = 5;

/// One row of the capture tool output, split on the delimiter.
pub type Row = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointRecord {
    pub bssid: String,
    /// Numeric channel label, or empty if the tool did not report one.
    pub channel: String,
    /// Network name. Empty for hidden networks.
    pub ssid: String,
    pub power: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRecord {
    pub station: String,
    /// BSSID of the access point the station is associated with. Empty if unassociated.
    pub bssid: String,
    pub power: String,
}

/// The records of one capture cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub access_points: Vec<AccessPointRecord>,
    pub stations: Vec<StationRecord>,
}

/// Output of [parse_rows].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScan {
    pub sample: Sample,
    /// Set when no station marker row was found and every row was treated as an access point.
    pub degraded: bool,
}

/// Split raw rows into access point and station records.
///
/// Rows with too few fields, rows with an empty identifier and repeated header rows are skipped.
/// Relative order is kept.
pub fn parse_rows(rows: &[Row]) -> ParsedScan {
    if rows.is_empty() {
        return ParsedScan::default();
    }

    let marker = rows
        .iter()
        .position(|row| row.first().is_some_and(|f| f.trim() == STATION_MARKER));

    let (ap_rows, station_rows, degraded) = match marker {
        Some(idx) => (rows.get(1..idx).unwrap_or_default(), &rows[idx + 1..], false),
        None => (&rows[1..], &rows[..0], true),
    };

    ParsedScan {
        sample: Sample {
            access_points: ap_rows.iter().filter_map(|r| parse_access_point(r)).collect(),
            stations: station_rows.iter().filter_map(|r| parse_station(r)).collect(),
        },
        degraded,
    }
}

fn field(row: &[String], idx: usize) -> String {
    row.get(idx).map(|f| f.trim().to_string()).unwrap_or_default()
}

fn parse_access_point(row: &[String]) -> Option<AccessPointRecord> {
    if row.len() < AP_MIN_FIELDS {
        return None;
    }
    let bssid = field(row, AP_BSSID);
    if bssid.is_empty() || bssid == AP_HEADER {
        return None;
    }
    Some(AccessPointRecord {
        bssid,
        channel: field(row, AP_CHANNEL),
        ssid: field(row, AP_ESSID),
        power: field(row, AP_POWER),
    })
}

fn parse_station(row: &[String]) -> Option<StationRecord> {
    if row.len() < STATION_MIN_FIELDS {
        return None;
    }
    let station = field(row, STATION_MAC);
    if station.is_empty() || station == STATION_MARKER {
        return None;
    }
    Some(StationRecord {
        station,
        bssid: field(row, STATION_BSSID),
        power: field(row, STATION_POWER),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn ap_row(bssid: &str, channel: &str, power: &str, essid: &str) -> Row {
        row(&[
            bssid, " 2024-01-01", " 2024-01-01", channel, " 54", " WPA2", " CCMP", " PSK", power,
            " 10", " 0", " 0.0.0.0", " 5", essid, " ",
        ])
    }

    fn station_row(mac: &str, power: &str, bssid: &str) -> Row {
        row(&[mac, " 2024-01-01", " 2024-01-01", power, " 12", bssid, " "])
    }

    fn ap_header() -> Row {
        row(&[
            "BSSID", " First time seen", " Last time seen", " channel", " Speed", " Privacy",
            " Cipher", " Authentication", " Power", " # beacons", " # IV", " LAN IP",
            " ID-length", " ESSID", " Key",
        ])
    }

    fn station_header() -> Row {
        row(&[
            "Station MAC", " First time seen", " Last time seen", " Power", " # packets",
            " BSSID", " Probed ESSIDs",
        ])
    }

    #[test]
    fn splits_sections_at_marker() {
        let rows = vec![
            ap_header(),
            ap_row("aa:bb", " 6", " -50", " MyNet"),
            station_header(),
            station_row("11:22", " -40", " aa:bb"),
        ];

        let parsed = parse_rows(&rows);
        assert!(!parsed.degraded);
        assert_eq!(
            parsed.sample.access_points,
            vec![AccessPointRecord {
                bssid: "aa:bb".into(),
                channel: "6".into(),
                ssid: "MyNet".into(),
                power: "-50".into(),
            }]
        );
        assert_eq!(
            parsed.sample.stations,
            vec![StationRecord {
                station: "11:22".into(),
                bssid: "aa:bb".into(),
                power: "-40".into(),
            }]
        );
    }

    #[test]
    fn short_rows_are_skipped() {
        let rows = vec![
            ap_header(),
            row(&["aa:bb", "x", "y"]),
            ap_row("cc:dd", " 11", " -70", " Other"),
            station_header(),
            row(&["11:22", "x", "y", "-40", "z"]),
            station_row("33:44", " -60", ""),
        ];

        let sample = parse_rows(&rows).sample;
        assert_eq!(sample.access_points.len(), 1);
        assert_eq!(sample.access_points[0].bssid, "cc:dd");
        assert_eq!(sample.stations.len(), 1);
        assert_eq!(sample.stations[0].station, "33:44");
        assert_eq!(sample.stations[0].bssid, "");
    }

    #[test]
    fn short_ap_row_keeps_missing_fields_empty() {
        let rows = vec![ap_header(), row(&["aa:bb", "", "", " 1"])];

        let ap = &parse_rows(&rows).sample.access_points[0];
        assert_eq!(ap.channel, "1");
        assert_eq!(ap.ssid, "");
        assert_eq!(ap.power, "");
    }

    #[test]
    fn missing_marker_degrades_to_access_points_only() {
        let rows = vec![
            ap_header(),
            ap_row("aa:bb", " 6", " -50", " One"),
            ap_row("cc:dd", " 1", " -60", " Two"),
        ];

        let parsed = parse_rows(&rows);
        assert!(parsed.degraded);
        assert!(parsed.sample.stations.is_empty());
        let bssids: Vec<_> = parsed
            .sample
            .access_points
            .iter()
            .map(|ap| ap.bssid.as_str())
            .collect();
        assert_eq!(bssids, ["aa:bb", "cc:dd"]);
    }

    #[test]
    fn order_is_preserved_and_headers_excluded() {
        let rows = vec![
            ap_header(),
            ap_row("03", " 1", "", ""),
            ap_header(),
            ap_row("01", " 6", "", ""),
            ap_row("02", " 11", "", ""),
            station_header(),
            station_row("b", "", ""),
            station_header(),
            station_row("a", "", ""),
        ];

        let sample = parse_rows(&rows).sample;
        let aps: Vec<_> = sample.access_points.iter().map(|a| a.bssid.as_str()).collect();
        let stations: Vec<_> = sample.stations.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(aps, ["03", "01", "02"]);
        assert_eq!(stations, ["b", "a"]);
    }

    #[test]
    fn marker_as_first_row_yields_no_access_points() {
        let rows = vec![station_header(), station_row("11:22", " -40", " aa:bb")];

        let parsed = parse_rows(&rows);
        assert!(parsed.sample.access_points.is_empty());
        assert_eq!(parsed.sample.stations.len(), 1);
    }

    #[test]
    fn empty_input_is_empty_sample() {
        assert_eq!(parse_rows(&[]), ParsedScan::default());
    }
}
