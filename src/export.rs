use std::io;

use crate::record::GameRecord;

pub fn file_name(size: usize) -> String {
    format!("nqueens_{}x{}_best_times.csv", size, size)
}

/// Writes the leaderboard as CSV, one ranked row per record.
pub fn write_csv<W: io::Write>(records: &[GameRecord], out: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Rank", "Board", "Time", "Seconds", "Date"])?;
    for (i, record) in records.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            format!("{}x{}", record.size, record.size),
            record.formatted_time(),
            format!("{:.3}", record.time),
            record.date.to_rfc3339(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[GameRecord]) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
