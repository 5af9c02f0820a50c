//! Derived Views
//!
//! Pure aggregates over store contents for dashboards. Anything time-based
//! takes `now` explicitly.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::domain::{Application, ApplicationStatus, Deadline, Interview, Offer, OfferStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub saved: usize,
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn from_applications(apps: &[Application]) -> Self {
        let mut counts = Self::default();
        for app in apps {
            match app.status {
                ApplicationStatus::Saved => counts.saved += 1,
                ApplicationStatus::Applied => counts.applied += 1,
                ApplicationStatus::Interview => counts.interview += 1,
                ApplicationStatus::Offer => counts.offer += 1,
                ApplicationStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.saved + self.submitted()
    }

    /// Everything past Saved
    pub fn submitted(&self) -> usize {
        self.applied + self.interview + self.offer + self.rejected
    }

    /// Share of submitted applications that got any answer
    pub fn response_rate(&self) -> f64 {
        percent(self.interview + self.offer + self.rejected, self.submitted())
    }

    /// Share of submitted applications that reached an interview
    pub fn interview_rate(&self) -> f64 {
        percent(self.interview + self.offer, self.submitted())
    }

    pub fn offer_rate(&self) -> f64 {
        percent(self.offer, self.submitted())
    }

    /// Cumulative stage counts: everyone who reached a stage also counts
    /// for the stages before it
    pub fn funnel(&self) -> Funnel {
        Funnel {
            saved: self.total(),
            applied: self.submitted(),
            interview: self.interview + self.offer,
            offer: self.offer,
            rejected: self.rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Funnel {
    pub saved: usize,
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Urgency {
    Overdue,
    Today,
    ThisWeek,
    Later,
    Completed,
}

impl Urgency {
    pub fn of(deadline: &Deadline, now: NaiveDateTime) -> Self {
        if deadline.completed {
            return Urgency::Completed;
        }
        let Some(due) = deadline.due_date else {
            return Urgency::Later;
        };
        if due < now {
            Urgency::Overdue
        } else if due.date() == now.date() {
            Urgency::Today
        } else if due < now + Duration::days(7) {
            Urgency::ThisWeek
        } else {
            Urgency::Later
        }
    }
}

/// Deadlines grouped by urgency, each group sorted by due date
pub fn deadline_buckets(deadlines: &[Deadline], now: NaiveDateTime) -> BTreeMap<Urgency, Vec<&Deadline>> {
    let mut buckets: BTreeMap<Urgency, Vec<&Deadline>> = BTreeMap::new();
    for deadline in deadlines {
        buckets.entry(Urgency::of(deadline, now)).or_default().push(deadline);
    }
    for group in buckets.values_mut() {
        // Undated deadlines sort last
        group.sort_by_key(|d| (d.due_date.is_none(), d.due_date, std::cmp::Reverse(d.priority)));
    }
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrepProgress {
    pub completed: usize,
    pub total: usize,
}

impl PrepProgress {
    pub fn of(interview: &Interview) -> Self {
        let (completed, total) = interview.prep_progress();
        Self { completed, total }
    }

    pub fn across(interviews: &[Interview]) -> Self {
        interviews.iter().map(Self::of).fold(Self::default(), |acc, p| Self {
            completed: acc.completed + p.completed,
            total: acc.total + p.total,
        })
    }

    pub fn percent(&self) -> f64 {
        percent(self.completed, self.total)
    }
}

/// Interviews on or after `today`, soonest first
pub fn upcoming_interviews(interviews: &[Interview], today: NaiveDate) -> Vec<&Interview> {
    let mut upcoming: Vec<&Interview> = interviews
        .iter()
        .filter(|i| i.date.is_some_and(|d| d >= today))
        .collect();
    upcoming.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
    upcoming
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OfferSummary {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub negotiating: usize,
    /// Best salary seen in each currency
    pub highest_salary: BTreeMap<String, f64>,
}

impl OfferSummary {
    pub fn from_offers(offers: &[Offer]) -> Self {
        let mut summary = Self::default();
        for offer in offers {
            match offer.status {
                OfferStatus::Pending => summary.pending += 1,
                OfferStatus::Accepted => summary.accepted += 1,
                OfferStatus::Rejected => summary.rejected += 1,
                OfferStatus::Negotiating => summary.negotiating += 1,
            }
            let best = summary
                .highest_salary
                .entry(offer.currency.clone())
                .or_insert(offer.salary);
            if offer.salary > *best {
                *best = offer.salary;
            }
        }
        summary
    }

    /// Offers still awaiting a decision
    pub fn open(&self) -> usize {
        self.pending + self.negotiating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChecklistItem, Priority};

    fn app(status: ApplicationStatus) -> Application {
        Application { status, ..Default::default() }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_rates_ignore_saved() {
        use ApplicationStatus::*;
        let apps: Vec<_> = [Saved, Saved, Applied, Applied, Interview, Offer, Rejected, Applied]
            .into_iter()
            .map(app)
            .collect();
        let counts = StatusCounts::from_applications(&apps);
        assert_eq!(counts.submitted(), 6);
        assert_eq!(counts.response_rate(), 50.0);
        assert!((counts.interview_rate() - 33.333).abs() < 0.01);
        assert!((counts.offer_rate() - 16.666).abs() < 0.01);
        assert_eq!(
            counts.funnel(),
            Funnel { saved: 8, applied: 6, interview: 2, offer: 1, rejected: 1 }
        );
    }

    #[test]
    fn test_empty_rates_are_zero() {
        let counts = StatusCounts::from_applications(&[app(ApplicationStatus::Saved)]);
        assert_eq!(counts.response_rate(), 0.0);
    }

    #[test]
    fn test_urgency_buckets() {
        let now = at(10, 12);
        let d = |id, due: Option<NaiveDateTime>, completed| Deadline {
            id,
            due_date: due,
            completed,
            ..Default::default()
        };
        let deadlines = vec![
            d(1, Some(at(9, 9)), false),
            d(2, Some(at(10, 18)), false),
            d(3, Some(at(14, 9)), false),
            d(4, Some(at(25, 9)), false),
            d(5, Some(at(1, 9)), true),
            d(6, None, false),
        ];
        let buckets = deadline_buckets(&deadlines, now);
        let ids = |u: Urgency| -> Vec<i64> { buckets[&u].iter().map(|d| d.id).collect() };
        assert_eq!(ids(Urgency::Overdue), vec![1]);
        assert_eq!(ids(Urgency::Today), vec![2]);
        assert_eq!(ids(Urgency::ThisWeek), vec![3]);
        assert_eq!(ids(Urgency::Later), vec![4, 6]);
        assert_eq!(ids(Urgency::Completed), vec![5]);
    }

    #[test]
    fn test_same_day_ties_break_on_priority() {
        let now = at(1, 8);
        let mk = |id, priority| Deadline { id, due_date: Some(at(1, 17)), priority, ..Default::default() };
        let deadlines = vec![mk(1, Priority::Low), mk(2, Priority::High)];
        let buckets = deadline_buckets(&deadlines, now);
        assert_eq!(buckets[&Urgency::Today][0].id, 2);
    }

    #[test]
    fn test_prep_progress_across_interviews() {
        let mut a = Interview::default();
        a.prep_checklist = vec![
            ChecklistItem { task: "Research".into(), completed: true },
            ChecklistItem { task: "".into(), completed: true },
        ];
        let mut b = Interview::default();
        b.prep_checklist = vec![ChecklistItem::new("Mock interview")];
        let progress = PrepProgress::across(&[a, b]);
        assert_eq!(progress, PrepProgress { completed: 1, total: 2 });
        assert_eq!(progress.percent(), 50.0);
    }

    #[test]
    fn test_upcoming_interviews_sorted() {
        let mk = |id, day| Interview {
            id,
            date: NaiveDate::from_ymd_opt(2025, 3, day),
            ..Default::default()
        };
        let list = vec![mk(1, 20), mk(2, 5), mk(3, 12)];
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let ids: Vec<_> = upcoming_interviews(&list, today).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_offer_summary() {
        let offer = |status, currency: &str, salary| Offer {
            status,
            currency: currency.into(),
            salary,
            ..Default::default()
        };
        let offers = vec![
            offer(OfferStatus::Pending, "KES", 250_000.0),
            offer(OfferStatus::Negotiating, "KES", 300_000.0),
            offer(OfferStatus::Accepted, "USD", 4_000.0),
        ];
        let summary = OfferSummary::from_offers(&offers);
        assert_eq!(summary.open(), 2);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.highest_salary["KES"], 300_000.0);
        assert_eq!(summary.highest_salary["USD"], 4_000.0);
    }
}
