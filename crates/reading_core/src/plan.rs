use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Number of days in the reading plan.
pub const TOTAL_DAYS: u32 = 90;

/// Calendar date of day 1.
pub const PLAN_START: NaiveDate = match NaiveDate::from_ymd_opt(2026, 1, 1) {
    Some(date) => date,
    None => panic!("plan start is not a valid date"),
};

/// A single day of the static reading plan.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlanEntry {
    pub day: u32,
    pub passage: &'static str,
    pub scheduled_date: NaiveDate,
    pub reading_url: &'static str,
}

impl PlanEntry {
    pub fn scheduled_date_string(&self) -> String {
        self.scheduled_date.format("%Y-%m-%d").to_string()
    }
}

/// Scheduled calendar date for `day`, or `None` outside `1..=TOTAL_DAYS`.
pub fn scheduled_date(day: u32) -> Option<NaiveDate> {
    if !(1..=TOTAL_DAYS).contains(&day) {
        return None;
    }
    Some(PLAN_START + Duration::days(i64::from(day - 1)))
}

pub fn scheduled_date_string(day: u32) -> Option<String> {
    scheduled_date(day).map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn plan_entry_for_day(day: u32) -> Option<PlanEntry> {
    let index = usize::try_from(day.checked_sub(1)?).ok()?;
    let (passage, reading_url) = *PLAN.get(index)?;
    Some(PlanEntry {
        day,
        passage,
        scheduled_date: scheduled_date(day)?,
        reading_url,
    })
}

/// All plan entries in day order.
pub fn reading_plan() -> impl Iterator<Item = PlanEntry> {
    (1..=TOTAL_DAYS).filter_map(plan_entry_for_day)
}

const PLAN: [(&str, &str); TOTAL_DAYS as usize] = [
    ("Romans 1-8", "https://www.bible.com/bible/111/ROM.1.NIV"),
    ("Romans 9-16", "https://www.bible.com/bible/111/ROM.9.NIV"),
    ("Hebrews 1-6", "https://www.bible.com/bible/111/HEB.1.NIV"),
    ("Hebrews 7-13", "https://www.bible.com/bible/111/HEB.7.NIV"),
    ("James & 1 John", "https://www.bible.com/bible/111/JAS.1.NIV"),
    ("1 Peter, 2 Peter, 2 John, 3 John", "https://www.bible.com/bible/111/1PE.1.NIV"),
    ("John 1-10", "https://www.bible.com/bible/111/JHN.1.NIV"),
    ("John 11-21", "https://www.bible.com/bible/111/JHN.11.NIV"),
    ("Mark 1-8", "https://www.bible.com/bible/111/MRK.1.NIV"),
    ("Mark 9-16", "https://www.bible.com/bible/111/MRK.9.NIV"),
    ("Matthew 1-10", "https://www.bible.com/bible/111/MAT.1.NIV"),
    ("Matthew 11-20", "https://www.bible.com/bible/111/MAT.11.NIV"),
    ("Matthew 21-28", "https://www.bible.com/bible/111/MAT.21.NIV"),
    ("Luke 1-12", "https://www.bible.com/bible/111/LUK.1.NIV"),
    ("Luke 13-24", "https://www.bible.com/bible/111/LUK.13.NIV"),
    ("Acts 1-10", "https://www.bible.com/bible/111/ACT.1.NIV"),
    ("Acts 11-20", "https://www.bible.com/bible/111/ACT.11.NIV"),
    ("Acts 21-28", "https://www.bible.com/bible/111/ACT.21.NIV"),
    ("Revelation 1-10", "https://www.bible.com/bible/111/REV.1.NIV"),
    ("Revelation 11-22", "https://www.bible.com/bible/111/REV.11.NIV"),
    ("Daniel", "https://www.bible.com/bible/111/DAN.1.NIV"),
    ("Genesis 1-15", "https://www.bible.com/bible/111/GEN.1.NIV"),
    ("Genesis 16-33", "https://www.bible.com/bible/111/GEN.16.NIV"),
    ("Genesis 34-50", "https://www.bible.com/bible/111/GEN.34.NIV"),
    ("Exodus 1-15", "https://www.bible.com/bible/111/EXO.1.NIV"),
    ("Romans 1-8", "https://www.bible.com/bible/111/ROM.1.NIV"),
    ("Romans 9-16", "https://www.bible.com/bible/111/ROM.9.NIV"),
    ("Hebrews 1-6", "https://www.bible.com/bible/111/HEB.1.NIV"),
    ("Hebrews 7-13", "https://www.bible.com/bible/111/HEB.7.NIV"),
    ("James & 1 John", "https://www.bible.com/bible/111/JAS.1.NIV"),
    ("1 Peter, 2 Peter, 2 John, 3 John", "https://www.bible.com/bible/111/1PE.1.NIV"),
    ("John 1-10", "https://www.bible.com/bible/111/JHN.1.NIV"),
    ("John 11-21", "https://www.bible.com/bible/111/JHN.11.NIV"),
    ("Mark 1-8", "https://www.bible.com/bible/111/MRK.1.NIV"),
    ("Mark 9-16", "https://www.bible.com/bible/111/MRK.9.NIV"),
    ("Matthew 1-10", "https://www.bible.com/bible/111/MAT.1.NIV"),
    ("Matthew 11-20", "https://www.bible.com/bible/111/MAT.11.NIV"),
    ("Matthew 21-28", "https://www.bible.com/bible/111/MAT.21.NIV"),
    ("Luke 1-12", "https://www.bible.com/bible/111/LUK.1.NIV"),
    ("Luke 13-24", "https://www.bible.com/bible/111/LUK.13.NIV"),
    ("Acts 1-10", "https://www.bible.com/bible/111/ACT.1.NIV"),
    ("Acts 11-20", "https://www.bible.com/bible/111/ACT.11.NIV"),
    ("Acts 21-28", "https://www.bible.com/bible/111/ACT.21.NIV"),
    ("Revelation 1-10", "https://www.bible.com/bible/111/REV.1.NIV"),
    ("Revelation 11-22", "https://www.bible.com/bible/111/REV.11.NIV"),
    ("Daniel", "https://www.bible.com/bible/111/DAN.1.NIV"),
    ("Genesis 1-15", "https://www.bible.com/bible/111/GEN.1.NIV"),
    ("Genesis 16-33", "https://www.bible.com/bible/111/GEN.16.NIV"),
    ("Genesis 34-50", "https://www.bible.com/bible/111/GEN.34.NIV"),
    ("Exodus 1-15", "https://www.bible.com/bible/111/EXO.1.NIV"),
    ("Exodus 16-30", "https://www.bible.com/bible/111/EXO.16.NIV"),
    ("Exodus 31-40", "https://www.bible.com/bible/111/EXO.31.NIV"),
    ("Leviticus 1-14", "https://www.bible.com/bible/111/LEV.1.NIV"),
    ("Leviticus 15-27", "https://www.bible.com/bible/111/LEV.15.NIV"),
    ("Numbers 1-18", "https://www.bible.com/bible/111/NUM.1.NIV"),
    ("Numbers 19-36", "https://www.bible.com/bible/111/NUM.19.NIV"),
    ("Deuteronomy 1-17", "https://www.bible.com/bible/111/DEU.1.NIV"),
    ("Deuteronomy 18-34", "https://www.bible.com/bible/111/DEU.18.NIV"),
    ("Joshua", "https://www.bible.com/bible/111/JOS.1.NIV"),
    ("Judges & Ruth", "https://www.bible.com/bible/111/JDG.1.NIV"),
    ("1 Samuel", "https://www.bible.com/bible/111/1SA.1.NIV"),
    ("2 Samuel", "https://www.bible.com/bible/111/2SA.1.NIV"),
    ("1 Kings", "https://www.bible.com/bible/111/1KI.1.NIV"),
    ("2 Kings", "https://www.bible.com/bible/111/2KI.1.NIV"),
    ("1 Chronicles", "https://www.bible.com/bible/111/1CH.1.NIV"),
    ("2 Chronicles", "https://www.bible.com/bible/111/2CH.1.NIV"),
    ("Ezra & Nehemiah", "https://www.bible.com/bible/111/EZR.1.NIV"),
    ("Esther & Job 1-20", "https://www.bible.com/bible/111/EST.1.NIV"),
    ("Job 21-42", "https://www.bible.com/bible/111/JOB.21.NIV"),
    ("Psalms 1-50", "https://www.bible.com/bible/111/PSA.1.NIV"),
    ("Psalms 51-100", "https://www.bible.com/bible/111/PSA.51.NIV"),
    ("Psalms 101-150", "https://www.bible.com/bible/111/PSA.101.NIV"),
    ("Proverbs", "https://www.bible.com/bible/111/PRO.1.NIV"),
    ("Ecclesiastes & Song of Solomon", "https://www.bible.com/bible/111/ECC.1.NIV"),
    ("Isaiah 1-33", "https://www.bible.com/bible/111/ISA.1.NIV"),
    ("Isaiah 34-66", "https://www.bible.com/bible/111/ISA.34.NIV"),
    ("Jeremiah 1-26", "https://www.bible.com/bible/111/JER.1.NIV"),
    ("Jeremiah 27-52 & Lamentations", "https://www.bible.com/bible/111/JER.27.NIV"),
    ("Ezekiel 1-24", "https://www.bible.com/bible/111/EZK.1.NIV"),
    ("Ezekiel 25-48", "https://www.bible.com/bible/111/EZK.25.NIV"),
    ("Hosea, Joel & Amos", "https://www.bible.com/bible/111/HOS.1.NIV"),
    ("Obadiah, Jonah, Micah & Nahum", "https://www.bible.com/bible/111/OBA.1.NIV"),
    ("Habakkuk, Zephaniah, Haggai & Zechariah", "https://www.bible.com/bible/111/HAB.1.NIV"),
    ("Malachi & 1 Corinthians 1-9", "https://www.bible.com/bible/111/MAL.1.NIV"),
    ("1 Corinthians 10-16 & 2 Corinthians 1-7", "https://www.bible.com/bible/111/1CO.10.NIV"),
    ("2 Corinthians 8-13 & Galatians", "https://www.bible.com/bible/111/2CO.8.NIV"),
    ("Ephesians, Philippians & Colossians", "https://www.bible.com/bible/111/EPH.1.NIV"),
    ("1 Thessalonians, 2 Thessalonians, 1 Timothy & 2 Timothy", "https://www.bible.com/bible/111/1TH.1.NIV"),
    ("Titus, Philemon & Jude", "https://www.bible.com/bible/111/TIT.1.NIV"),
    ("Review & Reflection — All 90 Days Complete! 🎉", "https://www.bible.com/reading-plans"),
];
