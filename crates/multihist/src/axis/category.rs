//! Discrete labels, either integers or strings.

use crate::{
    coord::Coord,
    error::{Error, Result},
};

/// Category binning law. Bin `k` holds exactly the `k`-th label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category {
    /// Integer labels.
    Int(Vec<i64>),
    /// String labels.
    Str(Vec<String>),
}

impl Category {
    /// Construct from a list of labels. Labels must share one type and be
    /// unique.
    pub fn new(labels: Vec<Coord>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::config("category axis needs at least one label"));
        }
        let cat = if labels.iter().all(|c| matches!(c, Coord::Int(_))) {
            Self::Int(
                labels
                    .into_iter()
                    .filter_map(|c| match c {
                        Coord::Int(v) => Some(v),
                        _ => None,
                    })
                    .collect(),
            )
        } else if labels.iter().all(|c| matches!(c, Coord::Str(_))) {
            Self::Str(
                labels
                    .into_iter()
                    .filter_map(|c| match c {
                        Coord::Str(v) => Some(v),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            return Err(Error::config(
                "category labels must be all integers or all strings",
            ));
        };
        if (0..cat.size()).any(|i| cat.position_of(&cat.label(i)) != Some(i)) {
            return Err(Error::config("category labels must be unique"));
        }
        Ok(cat)
    }

    /// Number of labels.
    pub fn size(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    /// Whether the labels are strings.
    pub fn is_str(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    /// Label of bin `i`, which must be in range.
    pub fn label(&self, i: usize) -> Coord {
        match self {
            Self::Int(v) => Coord::Int(v[i]),
            Self::Str(v) => Coord::Str(v[i].clone()),
        }
    }

    /// Position of a label of the right type, if present.
    fn position_of(&self, c: &Coord) -> Option<usize> {
        match (self, c) {
            (Self::Int(v), Coord::Int(x)) => v.iter().position(|e| e == x),
            (Self::Str(v), Coord::Str(x)) => v.iter().position(|e| e == x),
            _ => None,
        }
    }

    /// Fail unless `c` has this axis' label type.
    fn check_type(&self, c: &Coord) -> Result<()> {
        match (self, c) {
            (Self::Int(_), Coord::Int(_)) | (Self::Str(_), Coord::Str(_)) => Ok(()),
            _ => Err(Error::index(format!(
                "{} category axis cannot look up a {} value",
                if self.is_str() { "str" } else { "int" },
                c.kind()
            ))),
        }
    }

    /// Bin of a label, or `size` if the label is unknown.
    pub fn index(&self, c: &Coord) -> Result<i64> {
        self.check_type(c)?;
        Ok(self.position_of(c).unwrap_or(self.size()) as i64)
    }

    /// Bin of a label, appending it if it is unknown.
    pub fn grow(&mut self, c: &Coord) -> Result<i64> {
        self.check_type(c)?;
        if let Some(i) = self.position_of(c) {
            return Ok(i as i64);
        }
        match (&mut *self, c) {
            (Self::Int(v), Coord::Int(x)) => v.push(*x),
            (Self::Str(v), Coord::Str(x)) => v.push(x.clone()),
            _ => {}
        }
        Ok(self.size() as i64 - 1)
    }

    /// Labels `[begin, end)`.
    pub fn slice(&self, begin: usize, end: usize) -> Self {
        match self {
            Self::Int(v) => Self::Int(v[begin..end].to_vec()),
            Self::Str(v) => Self::Str(v[begin..end].to_vec()),
        }
    }

    /// All labels in bin order.
    pub fn labels(&self) -> Vec<Coord> {
        (0..self.size()).map(|i| self.label(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mixed_and_duplicate() {
        assert!(Category::new(vec![Coord::Int(1), Coord::from("a")]).is_err());
        assert!(Category::new(vec![Coord::Int(1), Coord::Int(1)]).is_err());
        assert!(Category::new(vec![]).is_err());
        assert!(Category::new(vec![Coord::Float(1.0)]).is_err());
    }

    #[test]
    fn lookup_and_grow() -> Result<()> {
        let mut c = Category::new(vec!["a".into(), "b".into()])?;
        assert_eq!(c.index(&"b".into())?, 1);
        assert_eq!(c.index(&"z".into())?, 2);
        assert!(c.index(&Coord::Int(1)).is_err());
        assert_eq!(c.grow(&"z".into())?, 2);
        assert_eq!(c.size(), 3);
        assert_eq!(c.label(2), Coord::from("z"));
        Ok(())
    }
}
