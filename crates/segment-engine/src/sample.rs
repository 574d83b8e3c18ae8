/// One (segment, user, action) triple, freshly drawn or replayed from the repetition buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sample {
    pub segment: u64,
    pub user: u64,
    pub add: bool,
}
