use core::fmt::{self, Write as _};

use super::{MatrixView, MatrixViewMut, MAX_DIM};
use crate::traits::MatrixRef;

// ── Display ─────────────────────────────────────────────────────────

fn display<T: fmt::Display>(m: &impl MatrixRef<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (rows, cols) = (m.nrows(), m.ncols());

    // Find max width per column for alignment
    let mut widths = [0usize; MAX_DIM];
    for (j, width) in widths.iter_mut().enumerate().take(cols) {
        for i in 0..rows {
            let w = WriteCounting::count(|wc| write!(wc, "{}", m.get(i, j)));
            if w > *width {
                *width = w;
            }
        }
    }

    for i in 0..rows {
        write!(f, "│")?;
        for (j, &width) in widths.iter().enumerate().take(cols) {
            if j > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:>width$}", m.get(i, j), width = width)?;
        }
        write!(f, "│")?;
        if i + 1 < rows {
            writeln!(f)?;
        }
    }
    Ok(())
}

impl<T: fmt::Display> fmt::Display for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

impl<T: fmt::Display> fmt::Display for MatrixViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

/// Helper to count characters written, without allocating.
struct WriteCounting {
    count: usize,
}

impl WriteCounting {
    fn count(f: impl FnOnce(&mut Self) -> fmt::Result) -> usize {
        let mut wc = WriteCounting { count: 0 };
        let _ = f(&mut wc);
        wc.count
    }
}

impl fmt::Write for WriteCounting {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.count += s.chars().count();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_2x2() {
        let m = MatrixView::new(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let s = format!("{}", m);
        assert!(s.contains('1'));
        assert!(s.contains('4'));
        assert_eq!(s.lines().count(), 2);
    }

    #[test]
    fn display_alignment() {
        let m = MatrixView::new(2, 2, &[1, 100, 1000, 2]).unwrap();
        let s = format!("{}", m);
        // Both rows should have the same length due to alignment
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[1], "│1000    2│");
    }

    #[test]
    fn display_only_active_block() {
        let mut buf = [1, 2, 3, 4, 99];
        let m = MatrixViewMut::new(1, 4, &mut buf).unwrap();
        let s = format!("{}", m);
        assert_eq!(s.lines().count(), 1);
        assert!(!s.contains("99"));
    }
}
