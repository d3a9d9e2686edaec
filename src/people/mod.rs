/*!

Individuals are plain indices (`PersonId`) into the columns of `PeopleData`: one
`PropertyStore` per property type. Nothing is allocated per person beyond the column entries,
and a person lives for the whole run.

*/

mod context_ext;
mod data;
mod init_list;

// `ContextPeopleExt` is the public API to `PeopleData`.
pub(crate) use data::PeopleData;
pub use init_list::InitializationList;

pub use context_ext::ContextPeopleExt;

use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    /// The position of this person in the property columns of their context.
    #[must_use]
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Person {}", self.0)
    }
}
