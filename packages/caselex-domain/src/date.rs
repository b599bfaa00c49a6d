use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_iso_date(raw: &str) -> Option<Date> {
	Date::parse(raw.trim(), ISO_DATE).ok()
}

pub fn format_iso_date(date: Date) -> String {
	date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Orders an optional date range, reporting whether the bounds had to be swapped.
pub fn ordered_range(from: Option<Date>, to: Option<Date>) -> (Option<Date>, Option<Date>, bool) {
	match (from, to) {
		(Some(from), Some(to)) if from > to => (Some(to), Some(from), true),
		_ => (from, to, false),
	}
}

pub fn within(date: Option<Date>, from: Option<Date>, to: Option<Date>) -> bool {
	if from.is_none() && to.is_none() {
		return true;
	}

	let Some(date) = date else { return false };

	from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
}
