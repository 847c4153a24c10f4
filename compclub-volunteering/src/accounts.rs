use tracing::info;

use crate::error::Result;
use crate::model::{validate_position, NewUser, Volunteer, VolunteerId};
use crate::store::Store;

/// Creates a user account and its volunteer record in one go. This is the only
/// way volunteers come into existence.
pub async fn create_user(store: &dyn Store, new_user: NewUser) -> Result<Volunteer> {
    new_user.validate()?;
    let volunteer = store.create_user(new_user).await?;
    info!(
        user_id = %volunteer.user.id,
        volunteer_id = %volunteer.id,
        "created user"
    );
    Ok(volunteer)
}

pub async fn set_position(
    store: &dyn Store,
    volunteer_id: VolunteerId,
    position: Option<String>,
) -> Result<Volunteer> {
    validate_position(position.as_deref())?;
    store.set_position(volunteer_id, position).await
}
