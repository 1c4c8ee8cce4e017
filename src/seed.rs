//! Compiled-in seed catalogs: the initial users, sheets, dashboard cards,
//! theme and shared notes a fresh branch starts from. Not user-editable.
//! Seed passwords are plaintext on purpose — they are the only place
//! credentials live, and they are re-attached to persisted users on load.

use lazy_static::lazy_static;

use crate::document::{
    DashboardCard, Document, PermissionLevel, SharedNotes, ThemeSettings, User,
};
use crate::sheet::Sheet;

/// Blank rows every seed sheet starts with.
pub const SEED_ROW_COUNT: usize = 20;

lazy_static! {
    /// The default document a first run (or an unparseable store) starts from.
    pub static ref SEED_DOCUMENT: Document = Document {
        users: seed_users(),
        sheets: seed_sheets(),
        audit_log: Vec::new(),
        dashboard_cards: seed_cards(),
        theme_settings: seed_theme(),
        shared_notes: seed_shared_notes(),
        collaborative_notes: Vec::new(),
    };
}

fn user(id: &str, username: &str, password: &str, permissions: PermissionLevel) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        password: Some(password.to_string()),
        permissions,
        customizer: false,
    }
}

pub fn seed_users() -> Vec<User> {
    vec![
        user("user-1", "Ahmad.122", "ahmad217", PermissionLevel::DataEntry),
        User {
            customizer: true,
            ..user("user-2", "Saja.122", "saja155", PermissionLevel::Admin)
        },
        user("user-3", "khaled.122", "khaled.256", PermissionLevel::DataEntry),
        user("admin-1", "admin", "admin", PermissionLevel::Admin),
    ]
}

pub fn seed_sheets() -> Vec<Sheet> {
    vec![
        Sheet::seeded(
            "cleanliness",
            "نظافة المطعم",
            &["المهمة", "المسؤول", "الوقت المحدد", "الحالة", "ملاحظات"],
            SEED_ROW_COUNT,
        ),
        Sheet::seeded(
            "orders",
            "استلام الطلبيات",
            &[
                "المنتج",
                "المورد",
                "الكمية المستلمة",
                "تاريخ الاستلام",
                "المستلم",
                "رقم الفاتورة",
            ],
            SEED_ROW_COUNT,
        ),
        Sheet::seeded(
            "training",
            "تدريب الموظفين",
            &[
                "اسم الموظف",
                "الدورة التدريبية",
                "تاريخ البدء",
                "تاريخ الانتهاء",
                "النتيجة",
                "المدرب",
            ],
            SEED_ROW_COUNT,
        ),
        Sheet::seeded(
            "suppliers",
            "إدارة الموردين",
            &[
                "اسم المورد",
                "الكمية",
                "النواقص",
                "الموظف الذي استلمها",
                "المشرف",
                "حالة الطلبية",
            ],
            SEED_ROW_COUNT,
        ),
        Sheet::seeded(
            "maintenance",
            "إدارة الصيانة",
            &[
                "التاريخ",
                "المعدات",
                "نوع الصيانة (وقائية او طارئة)",
                "الموظف المسؤول",
                "تاريخ التبليغ",
                "تاريخ اغلاق الصيانة",
                "ملاحظات",
            ],
            SEED_ROW_COUNT,
        ),
        Sheet::seeded(
            "expiry",
            "شيت الصلاحيات",
            &["المنتج", "الصلاحية 1", "الصلاحية 2", "الصلاحية 3", "ملاحظات"],
            SEED_ROW_COUNT,
        ),
    ]
}

fn card(id: &str, title: &str, path: &str, icon: &str, desc: &str, admin_only: bool) -> DashboardCard {
    DashboardCard {
        id: id.to_string(),
        title: title.to_string(),
        path: path.to_string(),
        icon: icon.to_string(),
        desc: desc.to_string(),
        admin_only,
    }
}

pub fn seed_cards() -> Vec<DashboardCard> {
    vec![
        card(
            "card-1",
            "نظافة المطعم",
            "/sheet/cleanliness",
            "SheetIcon",
            "تتبع مهام النظافة اليومية والأسبوعية.",
            false,
        ),
        card(
            "card-2",
            "استلام الطلبيات",
            "/sheet/orders",
            "SheetIcon",
            "سجل واردات المخزون والطلبيات من الموردين.",
            false,
        ),
        card(
            "card-3",
            "تدريب الموظفين",
            "/sheet/training",
            "SheetIcon",
            "متابعة تقدم الموظفين في البرامج التدريبية.",
            false,
        ),
        card(
            "card-4",
            "إدارة الموردين",
            "/sheet/suppliers",
            "SheetIcon",
            "متابعة الموردين والكميات المستلمة.",
            false,
        ),
        card(
            "card-5",
            "إدارة الصيانة",
            "/sheet/maintenance",
            "SheetIcon",
            "سجل عمليات الصيانة الوقائية والطارئة.",
            false,
        ),
        card(
            "card-6",
            "شيت الصلاحيات",
            "/sheet/expiry",
            "SheetIcon",
            "تتبع تواريخ صلاحية المنتجات.",
            false,
        ),
        card(
            "card-admin",
            "إدارة النظام",
            "/admin",
            "AdminIcon",
            "إدارة المستخدمين والصلاحيات وسجل التغييرات.",
            true,
        ),
    ]
}

pub fn seed_theme() -> ThemeSettings {
    ThemeSettings {
        background_color: "#f3f4f6".to_string(),
        background_image: String::new(),
    }
}

pub fn seed_shared_notes() -> SharedNotes {
    SharedNotes {
        title: "ملاحظات ومهام اليوم".to_string(),
        content: "لا توجد ملاحظات حالياً. يمكنك إضافة ملاحظات من خلال الضغط على زر \"تعديل الملاحظات\" في الشريط العلوي (خاص بصلاحيات معينة).".to_string(),
    }
}
