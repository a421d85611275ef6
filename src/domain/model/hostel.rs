use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::model::{HostelId, HostelStatus, HostelType, Money, UserId};

/// ホステルの連絡先
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// ホステル登録時の入力
#[derive(Debug, Clone)]
pub struct HostelProfile {
    pub name: String,
    pub location: String,
    pub city: String,
    pub description: String,
    pub hostel_type: HostelType,
    pub price_min: Money,
    pub price_max: Money,
    pub contact: Contact,
}

impl HostelProfile {
    /// 必須項目と価格帯を検証する
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("location", &self.location),
            ("city", &self.city),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(field, "必須項目です"));
            }
        }
        if self.price_min.paisa() < 0 {
            return Err(DomainError::validation(
                "price_min",
                "最低価格は0以上である必要があります",
            ));
        }
        if self.price_max < self.price_min {
            return Err(DomainError::validation(
                "price_max",
                "最高価格は最低価格以上である必要があります",
            ));
        }
        Ok(())
    }
}

/// Hostel集約
/// 管理者の承認を経て公開される
#[derive(Debug, Clone)]
pub struct Hostel {
    id: HostelId,
    owner_id: UserId,
    profile: HostelProfile,
    status: HostelStatus,
    approved_by: Option<UserId>,
    approved_at: Option<DateTime<Utc>>,
}

impl Hostel {
    /// オーナーが新しいホステルを登録する（審査待ち）
    pub fn register(id: HostelId, owner_id: UserId, profile: HostelProfile) -> Result<Self, DomainError> {
        profile.validate()?;
        Ok(Self {
            id,
            owner_id,
            profile,
            status: HostelStatus::Pending,
            approved_by: None,
            approved_at: None,
        })
    }

    /// データベースから取得したデータでホステルを再構築
    pub fn reconstruct(
        id: HostelId,
        owner_id: UserId,
        profile: HostelProfile,
        status: HostelStatus,
        approved_by: Option<UserId>,
        approved_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            owner_id,
            profile,
            status,
            approved_by,
            approved_at,
        }
    }

    pub fn id(&self) -> HostelId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn profile(&self) -> &HostelProfile {
        &self.profile
    }

    pub fn status(&self) -> HostelStatus {
        self.status
    }

    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// 公開中（予約可能）か
    pub fn is_approved(&self) -> bool {
        self.status == HostelStatus::Active
    }

    /// 指定した利用者がオーナーか
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// 管理者がホステルを承認する
    pub fn approve(&mut self, admin_id: UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status == HostelStatus::Active {
            return Err(DomainError::InvalidValue(
                "既に承認済みのホステルです".to_string(),
            ));
        }
        self.status = HostelStatus::Active;
        self.approved_by = Some(admin_id);
        self.approved_at = Some(at);
        Ok(())
    }

    /// 管理者がホステルを却下する（記録は残す）
    pub fn reject(&mut self) -> Result<(), DomainError> {
        if self.status == HostelStatus::Rejected {
            return Err(DomainError::InvalidValue(
                "既に却下済みのホステルです".to_string(),
            ));
        }
        self.status = HostelStatus::Rejected;
        self.approved_by = None;
        self.approved_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> HostelProfile {
        HostelProfile {
            name: "Everest Boys Hostel".to_string(),
            location: "Baneshwor".to_string(),
            city: "Kathmandu".to_string(),
            description: "Near the college".to_string(),
            hostel_type: HostelType::Boys,
            price_min: Money::npr(4_000),
            price_max: Money::npr(9_000),
            contact: Contact::default(),
        }
    }

    #[test]
    fn test_registered_hostel_is_pending() {
        let hostel = Hostel::register(HostelId::new(), UserId::new(), profile()).unwrap();
        assert_eq!(hostel.status(), HostelStatus::Pending);
        assert!(!hostel.is_approved());
    }

    #[test]
    fn test_register_validates_profile() {
        let mut invalid = profile();
        invalid.city = String::new();
        let result = Hostel::register(HostelId::new(), UserId::new(), invalid);
        assert!(matches!(
            result,
            Err(DomainError::Validation { field: "city", .. })
        ));

        let mut inverted = profile();
        inverted.price_max = Money::npr(1_000);
        assert!(Hostel::register(HostelId::new(), UserId::new(), inverted).is_err());
    }

    #[test]
    fn test_approve_records_admin() {
        let mut hostel = Hostel::register(HostelId::new(), UserId::new(), profile()).unwrap();
        let admin = UserId::new();
        let now = Utc::now();

        hostel.approve(admin, now).unwrap();

        assert!(hostel.is_approved());
        assert_eq!(hostel.approved_by(), Some(admin));
        assert_eq!(hostel.approved_at(), Some(now));
        assert!(hostel.approve(admin, now).is_err());
    }

    #[test]
    fn test_reject_hides_hostel() {
        let mut hostel = Hostel::register(HostelId::new(), UserId::new(), profile()).unwrap();
        hostel.approve(UserId::new(), Utc::now()).unwrap();
        hostel.reject().unwrap();

        assert_eq!(hostel.status(), HostelStatus::Rejected);
        assert!(!hostel.is_approved());
        assert!(hostel.approved_by().is_none());
        assert!(hostel.reject().is_err());
    }
}
