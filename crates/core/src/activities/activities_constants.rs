/// Date formats accepted on stored records, tried in order after RFC 3339.
pub const RECORD_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y-%m-%dT%H:%M:%S"];
