use core::fmt::{self, Display};
use core::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MAX_NAME_LENGTH: usize = 100;
const MAX_POSITION_LENGTH: usize = 50;
const MIN_PHONE_DIGITS: usize = 8;

macro_rules! id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }
    };
}

id!(UserId);
id!(VolunteerId);
id!(EventId);
id!(WorkshopId);
id!(RegistrationId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::field("username", "username must not be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::field("first_name", "first name must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::field("last_name", "last name must not be empty"));
        }
        validate_email("email", &self.email)
    }
}

/// Every user account has exactly one volunteer record, created together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub user: User,
    pub position: Option<String>,
}

impl Display for Volunteer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.user.username, self.user.first_name, self.user.last_name
        )
    }
}

pub fn validate_position(position: Option<&str>) -> Result<(), ValidationError> {
    match position {
        Some(position) if position.trim().is_empty() => Err(ValidationError::field(
            "position",
            "position must not be empty",
        )),
        Some(position) if position.chars().count() > MAX_POSITION_LENGTH => {
            Err(ValidationError::field(
                "position",
                format!("position must be at most {MAX_POSITION_LENGTH} characters"),
            ))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub slug: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub owner: Option<VolunteerId>,
    pub description: Option<String>,
    pub prerequisite: String,
    pub period: String,
}

impl Event {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.finish_date
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    #[serde(default)]
    pub owner: Option<VolunteerId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisite: String,
    #[serde(default)]
    pub period: String,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.start_date > self.finish_date {
            return Err(ValidationError::field(
                "finish_date",
                format!(
                    "finish date cannot be earlier than start date {} > {}",
                    self.start_date, self.finish_date
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub workshop_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: WorkshopId,
    pub event_id: EventId,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewWorkshop {
    pub event_id: EventId,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
}

impl NewWorkshop {
    /// Only checked when the workshop is created. Moving the event later does
    /// not invalidate existing workshops.
    pub fn validate_for(&self, event: &Event) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if !event.contains(self.date) {
            return Err(ValidationError::field(
                "date",
                "workshop date cannot be earlier or later than the event dates",
            ));
        }
        if self.end_time <= self.start_time {
            return Err(ValidationError::field(
                "end_time",
                "workshop end time must be later than the start time",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
}

impl Recurrence {
    pub const fn interval_days(self) -> Option<u64> {
        match self {
            Self::None => None,
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "AS")]
    Assigned,
    #[serde(rename = "WL")]
    Waitlist,
    #[serde(rename = "DE")]
    Declined,
}

impl AssignmentStatus {
    pub const ALL: [Self; 3] = [Self::Assigned, Self::Waitlist, Self::Declined];

    /// Two letter code as stored in the database and submitted by forms.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Assigned => "AS",
            Self::Waitlist => "WL",
            Self::Declined => "DE",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Assigned => "Assigned",
            Self::Waitlist => "Waitlist",
            Self::Declined => "Declined",
        }
    }
}

impl Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssignmentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == value)
            .ok_or_else(|| {
                ValidationError::field(
                    "status",
                    format!("unknown assignment status {value:?}, expected one of AS, WL, DE"),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub workshop_id: WorkshopId,
    pub volunteer_id: VolunteerId,
    pub status: AssignmentStatus,
}

/// An assignment joined with everything needed to describe it to the volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDetail {
    pub volunteer: Volunteer,
    pub workshop: Workshop,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub parent_email: String,
    pub parent_phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub event_id: EventId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub parent_email: String,
    pub parent_phone_number: String,
}

impl NewRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email("email", &self.email)?;
        validate_email("parent_email", &self.parent_email)?;
        if !has_phone_digits(&self.phone_number) || !has_phone_digits(&self.parent_phone_number)
        {
            return Err(ValidationError::field(
                "phone_number",
                format!("phone number is invalid, must be at least {MIN_PHONE_DIGITS} digits long"),
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::field("name", "name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::field(
            "name",
            format!("name must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn validate_email(field: &'static str, email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::field(
            field,
            format!("{email:?} is not a valid email address"),
        )),
    }
}

fn has_phone_digits(number: &str) -> bool {
    let mut run = 0;
    for c in number.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= MIN_PHONE_DIGITS {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
