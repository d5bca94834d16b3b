// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Canonical row shape handed to presenters.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Default)]
pub struct NormalizedRecord {
    pub id: Option<i64>,
    pub major: String,
    pub major_ref: String,
    pub major_type: String,
    pub friends: String,
    pub desc: String,
    pub sub1: String,
    pub sub2: String,
    pub sub3: String,
    pub univ: String,
    pub group: String,
}

/// The string-valued canonical fields, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Major,
    MajorRef,
    MajorType,
    Friends,
    Desc,
    Sub1,
    Sub2,
    Sub3,
    Univ,
    Group,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Major,
        Field::MajorRef,
        Field::MajorType,
        Field::Friends,
        Field::Desc,
        Field::Sub1,
        Field::Sub2,
        Field::Sub3,
        Field::Univ,
        Field::Group,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Major => "major",
            Field::MajorRef => "major_ref",
            Field::MajorType => "major_type",
            Field::Friends => "friends",
            Field::Desc => "desc",
            Field::Sub1 => "sub1",
            Field::Sub2 => "sub2",
            Field::Sub3 => "sub3",
            Field::Univ => "univ",
            Field::Group => "group",
        }
    }
}

impl NormalizedRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Major => &self.major,
            Field::MajorRef => &self.major_ref,
            Field::MajorType => &self.major_type,
            Field::Friends => &self.friends,
            Field::Desc => &self.desc,
            Field::Sub1 => &self.sub1,
            Field::Sub2 => &self.sub2,
            Field::Sub3 => &self.sub3,
            Field::Univ => &self.univ,
            Field::Group => &self.group,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Major => &mut self.major,
            Field::MajorRef => &mut self.major_ref,
            Field::MajorType => &mut self.major_type,
            Field::Friends => &mut self.friends,
            Field::Desc => &mut self.desc,
            Field::Sub1 => &mut self.sub1,
            Field::Sub2 => &mut self.sub2,
            Field::Sub3 => &mut self.sub3,
            Field::Univ => &mut self.univ,
            Field::Group => &mut self.group,
        }
    }
}
