//! openEHR Reference Model (RM) 1.1.0 record types.
//!
//! Concrete types are plain serde structs whose `_type` tag is their canonical model name.
//! Abstract RM types that appear as field types are closed enums (see [`crate::model::RmUnion`]).

pub mod common;
pub mod constants;
pub mod data_structures;
pub mod data_types;
pub mod ehr;
pub mod ehr_status;
pub mod identification;

pub use common::{Archetyped, PartyIdentified, PartyProxy, PartySelf};
pub use data_structures::{Cluster, Element, Item, ItemList, ItemSingle, ItemStructure, ItemTree};
pub use data_types::{
    CodePhrase, DataValue, DvBoolean, DvCodedText, DvCount, DvDateTime, DvEhrUri, DvIdentifier,
    DvQuantity, DvText, DvUri, TextValue, UriValue,
};
pub use ehr::Ehr;
pub use ehr_status::EhrStatus;
pub use identification::{
    ArchetypeId, GenericId, HierObjectId, LocatableRef, ObjectId, ObjectRef, ObjectRefValue,
    ObjectVersionId, PartyRef, TemplateId, TerminologyId, UidBasedId,
};
