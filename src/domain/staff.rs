// ==========================================
// 加算判定引擎 - 职员领域模型
// ==========================================
// 用途: 导入层/仓储层写入 StaffMember，引擎层只读 StaffForJudgment
// 红线: 资格代码未知时一律不匹配（fail closed）
// ==========================================

use crate::domain::types::{EmploymentStyle, PersonnelCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// QualificationCode - 资格代码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualificationCode {
    Pt,                 // 理学療法士
    Ot,                 // 作業療法士
    St,                 // 言語聴覚士
    Psychologist,       // 公認心理師
    NurseryTeacher,     // 保育士
    ChildInstructor,    // 児童指導員
    SocialWorker,       // 社会福祉士
    CareWorker,         // 介護福祉士
    PsychWelfareWorker, // 精神保健福祉士
    Nurse,              // 看護師
    VisionTrainer,      // 視能訓練士
}

impl QualificationCode {
    pub const ALL: [QualificationCode; 11] = [
        QualificationCode::Pt,
        QualificationCode::Ot,
        QualificationCode::St,
        QualificationCode::Psychologist,
        QualificationCode::NurseryTeacher,
        QualificationCode::ChildInstructor,
        QualificationCode::SocialWorker,
        QualificationCode::CareWorker,
        QualificationCode::PsychWelfareWorker,
        QualificationCode::Nurse,
        QualificationCode::VisionTrainer,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            QualificationCode::Pt => "PT",
            QualificationCode::Ot => "OT",
            QualificationCode::St => "ST",
            QualificationCode::Psychologist => "PSYCHOLOGIST",
            QualificationCode::NurseryTeacher => "NURSERY_TEACHER",
            QualificationCode::ChildInstructor => "CHILD_INSTRUCTOR",
            QualificationCode::SocialWorker => "SOCIAL_WORKER",
            QualificationCode::CareWorker => "CARE_WORKER",
            QualificationCode::PsychWelfareWorker => "PSYCH_WELFARE_WORKER",
            QualificationCode::Nurse => "NURSE",
            QualificationCode::VisionTrainer => "VISION_TRAINER",
        }
    }

    pub fn label_ja(&self) -> &'static str {
        match self {
            QualificationCode::Pt => "理学療法士",
            QualificationCode::Ot => "作業療法士",
            QualificationCode::St => "言語聴覚士",
            QualificationCode::Psychologist => "公認心理師",
            QualificationCode::NurseryTeacher => "保育士",
            QualificationCode::ChildInstructor => "児童指導員",
            QualificationCode::SocialWorker => "社会福祉士",
            QualificationCode::CareWorker => "介護福祉士",
            QualificationCode::PsychWelfareWorker => "精神保健福祉士",
            QualificationCode::Nurse => "看護師",
            QualificationCode::VisionTrainer => "視能訓練士",
        }
    }

    /// 从原始存储值解析资格代码
    ///
    /// 同时接受代码（"PT"）与日文名称（"理学療法士"）；无法识别时返回 None
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let upper = trimmed.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|q| q.code() == upper || q.label_ja() == trimmed)
    }
}

// ==========================================
// QualificationSet - 资格集合
// ==========================================
// 对应报酬告示中的 "児童指導員等" / "専門職" / "福祉専門職" 等口径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "set", content = "codes", rename_all = "snake_case")]
pub enum QualificationSet {
    /// 児童指導員等（保育士・児童指導員・PT/OT/ST・心理・福祉系）
    ChildInstructorEquivalent,
    /// 専門職（PT/OT/ST/公認心理師）
    Specialist,
    /// 専門的支援体制（専門職 + 視能訓練士）
    SpecialistSupport,
    /// 福祉専門職（社会福祉士・介護福祉士・精神保健福祉士・公認心理師）
    WelfareProfessional,
    /// 显式代码列表
    Codes(Vec<QualificationCode>),
}

impl QualificationSet {
    pub fn codes(&self) -> Vec<QualificationCode> {
        use QualificationCode::*;
        match self {
            QualificationSet::ChildInstructorEquivalent => vec![
                NurseryTeacher,
                ChildInstructor,
                Pt,
                Ot,
                St,
                Psychologist,
                SocialWorker,
                CareWorker,
                PsychWelfareWorker,
            ],
            QualificationSet::Specialist => vec![Pt, Ot, St, Psychologist],
            QualificationSet::SpecialistSupport => vec![Pt, Ot, St, Psychologist, VisionTrainer],
            QualificationSet::WelfareProfessional => {
                vec![SocialWorker, CareWorker, PsychWelfareWorker, Psychologist]
            }
            QualificationSet::Codes(codes) => codes.clone(),
        }
    }

    pub fn matches(&self, held: &BTreeSet<QualificationCode>) -> bool {
        self.codes().iter().any(|code| held.contains(code))
    }
}

// ==========================================
// StaffMember - 职员主数据（外部持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub employment_style: EmploymentStyle,
    pub weekly_hours: f64,                // 契约周工作时间
    pub qualifications: BTreeSet<String>, // 原始资格代码（未校验）
    pub years_of_experience: f64,
    pub personnel_category: PersonnelCategory,
    pub is_active: bool,
    #[serde(default)]
    pub is_manager: bool, // 管理者
    #[serde(default)]
    pub is_service_manager: bool, // 児童発達支援管理責任者
}

// ==========================================
// StaffForJudgment - 判定用职员（Roster Normalizer 输出）
// ==========================================
// 红线: 仅包含在职职员，FTE 非负
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffForJudgment {
    pub id: String,
    pub name: String,
    pub employment_style: EmploymentStyle,
    pub personnel_category: PersonnelCategory,
    pub is_manager: bool,
    pub is_service_manager: bool,
    pub weekly_hours: f64,
    pub qualifications: BTreeSet<QualificationCode>,
    pub years_of_experience: f64,
    pub fte: f64, // 常勤換算値
}

// ==========================================
// RawStaffRecord - 导入原始记录
// ==========================================
// 用途: 文件导入 → 字段映射后的中间结构，尚未做类型校验
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStaffRecord {
    pub staff_id: Option<String>,
    pub name: Option<String>,
    pub employment_style: Option<String>,
    pub weekly_hours: Option<f64>,
    pub qualifications: Vec<String>,
    pub years_of_experience: Option<f64>,
    pub personnel_category: Option<String>,
    pub is_active: Option<bool>,
    pub is_manager: Option<bool>,
    pub is_service_manager: Option<bool>,

    // 元信息
    pub row_number: usize,
}

// ==========================================
// 数据质量 (DQ)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 行被拒绝
    Warning, // 行被接受，字段已修正
    Info,    // 提示
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub staff_id: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}
