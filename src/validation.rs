//! Client-side checks run before anything is submitted to the chain.

use crate::models::{NewRide, NewUser, RegistrationForm, Ride, Role};
use ethers::types::U256;
use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be more than 6 characters")]
    UsernameTooShort,

    #[error("Email must be valid")]
    InvalidEmail,

    #[error("Please select a role")]
    MissingRole,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Destination is required")]
    MissingDestination,

    #[error("Driver name is required")]
    MissingDriverName,

    #[error("License plate is required")]
    MissingLicensePlate,

    #[error("Fare must be greater than zero")]
    NonPositiveFare,

    #[error("Number of passengers must be greater than zero")]
    NoPassengers,

    #[error("Total fare overflows")]
    FareOverflow,

    #[error("Seats must be between 1 and {max}")]
    SeatsOutOfRange { max: U256 },
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

/// Same acceptance as `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// The `\s` class of JavaScript regular expressions, which is not Unicode `White_Space`.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(is_js_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // a dot with at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn parse_role(role: &str) -> Result<Role, ValidationError> {
    if role.is_empty() {
        return Err(ValidationError::MissingRole);
    }
    role.parse().map_err(ValidationError::UnknownRole)
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email_address)?;
        let role = parse_role(&self.role)?;
        Ok(NewUser {
            username: self.username.clone(),
            email_address: self.email_address.clone(),
            role,
        })
    }
}

pub fn validate_new_ride(ride: &NewRide) -> Result<(), ValidationError> {
    if ride.destination.trim().is_empty() {
        return Err(ValidationError::MissingDestination);
    }
    if ride.driver_name.trim().is_empty() {
        return Err(ValidationError::MissingDriverName);
    }
    if ride.license_plate.trim().is_empty() {
        return Err(ValidationError::MissingLicensePlate);
    }
    if ride.fare_in_ethers.is_zero() {
        return Err(ValidationError::NonPositiveFare);
    }
    if ride.num_passengers.is_zero() {
        return Err(ValidationError::NoPassengers);
    }
    if ride.total_fare().is_none() {
        return Err(ValidationError::FareOverflow);
    }
    Ok(())
}

/// Seats paid for in one transaction: at least one, at most `num_passengers`.
pub fn validate_seats(seats: U256, ride: &Ride) -> Result<(), ValidationError> {
    if seats.is_zero() || seats > ride.num_passengers {
        return Err(ValidationError::SeatsOutOfRange {
            max: ride.num_passengers,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenAmount;

    fn ride_form() -> NewRide {
        NewRide {
            destination: "Airport".to_string(),
            fare_in_ethers: TokenAmount::from_tokens(5),
            num_passengers: U256::from(2),
            driver_name: "Ada Driver".to_string(),
            license_plate: "KJA-123".to_string(),
        }
    }

    #[test]
    fn username_needs_more_than_six_characters() {
        assert_eq!(validate_username(""), Err(ValidationError::UsernameTooShort));
        assert_eq!(validate_username("sixsix"), Err(ValidationError::UsernameTooShort));
        assert_eq!(validate_username("seven77"), Ok(()));
        assert_eq!(validate_username("a much longer name"), Ok(()));
    }

    #[test]
    fn email_follows_the_simple_pattern() {
        for ok in [
            "a@b.c",
            "rider@example.com",
            "x.y@mail.co.uk",
            "a@b..c",
            "a\u{85}b@c.d",
        ] {
            assert_eq!(validate_email(ok), Ok(()), "{ok}");
        }
        for bad in [
            "",
            "plain",
            "@b.c",
            "a@.c",
            "a@b.",
            "a@bc",
            "a@@b.c",
            "a@b@c.d",
            "a b@c.d",
            "a@b.c ",
            "a\u{feff}b@c.d",
            "a@b\u{3000}.c",
            "a\tb@c.d",
        ] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn role_must_be_driver_or_passenger() {
        assert_eq!(parse_role("driver"), Ok(Role::Driver));
        assert_eq!(parse_role("passenger"), Ok(Role::Passenger));
        assert_eq!(parse_role(""), Err(ValidationError::MissingRole));
        assert_eq!(
            parse_role("Driver"),
            Err(ValidationError::UnknownRole("Driver".to_string()))
        );
    }

    #[test]
    fn registration_form_reports_first_failing_field() {
        let form = RegistrationForm {
            username: "shorty".to_string(),
            email_address: "nope".to_string(),
            role: String::new(),
        };
        assert_eq!(form.validate(), Err(ValidationError::UsernameTooShort));

        let form = RegistrationForm {
            username: "longenough".to_string(),
            email_address: "rider@example.com".to_string(),
            role: "passenger".to_string(),
        };
        let user = form.validate().unwrap();
        assert_eq!(user.role, Role::Passenger);
    }

    #[test]
    fn ride_requires_positive_fare_and_passengers() {
        assert_eq!(validate_new_ride(&ride_form()), Ok(()));

        let mut free = ride_form();
        free.fare_in_ethers = TokenAmount::zero();
        assert_eq!(validate_new_ride(&free), Err(ValidationError::NonPositiveFare));

        let mut empty = ride_form();
        empty.num_passengers = U256::zero();
        assert_eq!(validate_new_ride(&empty), Err(ValidationError::NoPassengers));

        let mut nowhere = ride_form();
        nowhere.destination = "   ".to_string();
        assert_eq!(validate_new_ride(&nowhere), Err(ValidationError::MissingDestination));
    }

    #[test]
    fn ride_rejects_overflowing_total() {
        let mut huge = ride_form();
        huge.fare_in_ethers = TokenAmount::from_wei(U256::MAX);
        assert_eq!(validate_new_ride(&huge), Err(ValidationError::FareOverflow));
    }

    #[test]
    fn seats_are_bounded_by_ride_capacity() {
        let ride = Ride {
            num_passengers: U256::from(3),
            ..Default::default()
        };
        assert!(validate_seats(U256::zero(), &ride).is_err());
        assert!(validate_seats(U256::one(), &ride).is_ok());
        assert!(validate_seats(U256::from(3), &ride).is_ok());
        assert_eq!(
            validate_seats(U256::from(4), &ride),
            Err(ValidationError::SeatsOutOfRange { max: U256::from(3) })
        );
    }
}
