//! Explicit position over a loaded series.
//!
//! Callers own the cursor and pass it around; nothing here is global.

use crate::change::Change;
use crate::sample::Sample;

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a, T> {
    items: &'a [T],
    index: usize,
}

impl<'a, T> Cursor<'a, T> {
    /// Cursor at `index`, clamped to the last item.
    pub fn at(items: &'a [T], index: usize) -> Self {
        Cursor {
            items,
            index: index.min(items.len().saturating_sub(1)),
        }
    }

    pub fn last(items: &'a [T]) -> Self {
        Cursor::at(items, usize::MAX)
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&'a T> {
        self.items.get(self.index)
    }

    /// Step forward, wrapping to the start after the last item.
    pub fn advance(&mut self) -> Option<&'a T> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.items.len();
        self.current()
    }

    /// Step backward, wrapping to the end before the first item.
    pub fn retreat(&mut self) -> Option<&'a T> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + self.items.len() - 1) % self.items.len();
        self.current()
    }
}

impl Cursor<'_, Sample> {
    /// Price move from the first sample to the current one.
    pub fn day_change(&self) -> Option<Change> {
        let open = self.items.first()?;
        let current = self.current()?;
        Change::between(open.price, current.price).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn samples(prices: &[f64]) -> Vec<Sample> {
        let start = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| Sample {
                timestamp: start + chrono::Duration::minutes(15 * i as i64),
                price,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn test_advance_wraps() {
        let items = [1, 2, 3];
        let mut cursor = Cursor::at(&items, 0);
        assert_eq!(cursor.current(), Some(&1));
        assert_eq!(cursor.advance(), Some(&2));
        assert_eq!(cursor.advance(), Some(&3));
        assert_eq!(cursor.advance(), Some(&1));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_retreat_wraps() {
        let items = [1, 2, 3];
        let mut cursor = Cursor::at(&items, 0);
        assert_eq!(cursor.retreat(), Some(&3));
        assert_eq!(cursor.retreat(), Some(&2));
    }

    #[test]
    fn test_empty_cursor() {
        let items: [u8; 0] = [];
        let mut cursor = Cursor::last(&items);
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.retreat(), None);
    }

    #[test]
    fn test_at_clamps() {
        let items = [1, 2, 3];
        assert_eq!(Cursor::at(&items, 10).position(), 2);
        assert_eq!(Cursor::last(&items).current(), Some(&3));
    }

    #[test]
    fn test_day_change() {
        let series = samples(&[100.0, 104.0, 95.0]);
        let mut cursor = Cursor::at(&series, 0);
        assert_eq!(cursor.day_change().unwrap().absolute, 0.0);

        cursor.advance();
        let up = cursor.day_change().unwrap();
        assert!((up.percent - 4.0).abs() < 1e-9);

        cursor.advance();
        let down = cursor.day_change().unwrap();
        assert!(down.is_negative);
        assert!((down.absolute + 5.0).abs() < 1e-9);
    }
}
