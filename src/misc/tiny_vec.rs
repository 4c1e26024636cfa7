use std::{iter::Flatten, slice::Iter};

/// Fixed capacity vector living on the stack. Used for the small sets the rules
/// engine passes around (legal pieces, pieces on a cell, captured pieces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TinyVec<T, const N: usize> {
    data: [Option<T>; N],
    len: u8,
}

impl<T, const N: usize> TinyVec<T, N>
where
    T: Copy + PartialEq,
{
    pub const fn new() -> Self {
        const { assert!(N <= 255, "TinyVec supports up to 255 elements") }
        TinyVec {
            data: [const { None }; N],
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if (self.len as usize) < N {
            self.data[self.len as usize] = Some(value);
            self.len += 1;
        } else {
            panic!("TinyVec is full");
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Flatten<Iter<'_, Option<T>>> {
        self.data[..self.len as usize].iter().flatten()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len as usize {
            self.data[index].as_ref()
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }

    /// Removes the first element equal to `value`, keeping the order of the rest.
    pub fn remove(&mut self, value: &T) -> bool {
        let len = self.len as usize;
        match self.data[..len].iter().position(|v| v.as_ref() == Some(value)) {
            Some(pos) => {
                for i in pos..len - 1 {
                    self.data[i] = self.data[i + 1].take();
                }
                self.data[len - 1] = None;
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    pub fn all(&self, f: impl FnMut(&T) -> bool) -> bool {
        self.iter().all(f)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

impl<T: Copy + PartialEq, const N: usize> Default for TinyVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq, const N: usize> FromIterator<T> for TinyVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = TinyVec::new();
        for value in iter {
            vec.push(value);
        }
        vec
    }
}

impl<'a, T: Copy + PartialEq, const N: usize> IntoIterator for &'a TinyVec<T, N> {
    type Item = &'a T;
    type IntoIter = Flatten<Iter<'a, Option<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
