use crate::partials::Partial;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct VectorPartial {
    data: Box<[u8]>,
}

impl VectorPartial {
    pub fn from_slice(src: &[u8]) -> Self {
        Self {
            data: Box::from(src),
        }
    }
}

impl From<&[u8]> for VectorPartial {
    fn from(src: &[u8]) -> Self {
        Self::from_slice(src)
    }
}

impl AsRef<[u8]> for VectorPartial {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Partial for VectorPartial {
    fn partial_before(&self, length: usize) -> Self {
        assert!(length <= self.data.len());
        VectorPartial::from_slice(&self.data[..length])
    }

    fn partial_after(&self, start: usize) -> Self {
        assert!(start <= self.data.len());
        VectorPartial::from_slice(&self.data[start..])
    }

    fn partial_joined(&self, key: u8, other: &Self) -> Self {
        let mut v = Vec::with_capacity(self.data.len() + 1 + other.data.len());
        v.extend_from_slice(&self.data);
        v.push(key);
        v.extend_from_slice(&other.data);
        Self {
            data: v.into_boxed_slice(),
        }
    }

    #[inline(always)]
    fn at(&self, pos: usize) -> u8 {
        self.data[pos]
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.data.len()
    }

    fn prefix_length_slice(&self, slice: &[u8]) -> usize {
        self.data
            .iter()
            .zip(slice)
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn to_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use crate::partials::Partial;
    use crate::partials::vector_partial::VectorPartial;

    #[test]
    fn split_and_join() {
        let p = VectorPartial::from_slice(b"application");
        assert_eq!(p.partial_before(3).to_slice(), b"app");
        assert_eq!(p.partial_after(4).to_slice(), b"ication");
        let joined = p
            .partial_before(3)
            .partial_joined(b'l', &p.partial_after(4));
        assert_eq!(joined, p);
        assert_eq!(p.prefix_length_slice(b"apple"), 4);
        assert_eq!(p.prefix_length_slice(b"app"), 3);
        assert_eq!(p.prefix_length_slice(b"zebra"), 0);
        assert!(VectorPartial::default().is_empty());
    }
}
