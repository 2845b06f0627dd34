//! Employment, education and skill gap analysis over a résumé profile

use crate::profile::ResumeProfile;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const FULL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y"];
// Parsed with a day appended, since chrono needs one to build a date.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%m-%Y", "%B %Y"];

const BACHELOR_LEVEL: u8 = 3;
const STALE_EDUCATION_YEARS: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    EducationMissing,
    EducationLevel,
    EducationCurrency,
    TimelineMismatch,
    SkillsMissing,
    SkillCategory,
    JobRequirements,
}

impl FindingKind {
    pub fn label(&self) -> &'static str {
        match self {
            FindingKind::EducationMissing => "Education Missing",
            FindingKind::EducationLevel => "Education Level",
            FindingKind::EducationCurrency => "Education Currency",
            FindingKind::TimelineMismatch => "Timeline Mismatch",
            FindingKind::SkillsMissing => "Skills Missing",
            FindingKind::SkillCategory => "Skill Category",
            FindingKind::JobRequirements => "Job Requirements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentGap {
    pub from: String,
    pub to: String,
    pub duration_months: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Positive,
    Moderate,
    Concern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub kind: AssessmentKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub experience_gaps: Vec<EmploymentGap>,
    pub education_gaps: Vec<Finding>,
    pub skill_gaps: Vec<Finding>,
    pub assessment: Assessment,
}

impl GapReport {
    pub fn total(&self) -> usize {
        self.experience_gaps.len() + self.education_gaps.len() + self.skill_gaps.len()
    }

    pub fn high_severity(&self) -> usize {
        self.education_gaps
            .iter()
            .chain(self.skill_gaps.iter())
            .filter(|f| f.severity == Severity::High)
            .count()
    }
}

pub struct GapAnalyzer {
    year_regex: Regex,
    today: NaiveDate,
}

struct Job<'a> {
    start: NaiveDate,
    end: NaiveDate,
    title: &'a str,
    company: &'a str,
}

impl GapAnalyzer {
    /// `today` stands in for open-ended dates such as "present".
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year_regex: Regex::new(r"\b(?:19|20)\d{2}\b").expect("Invalid year regex"),
            today,
        }
    }

    pub fn analyze(&self, profile: &ResumeProfile, job_skills: Option<&BTreeSet<String>>) -> GapReport {
        let experience_gaps = self.experience_gaps(profile);
        let education_gaps = self.education_gaps(profile);
        let skill_gaps = self.skill_gaps(profile, job_skills);

        let mut report = GapReport {
            experience_gaps,
            education_gaps,
            skill_gaps,
            assessment: Assessment {
                kind: AssessmentKind::Positive,
                description: "Strong candidate with comprehensive background".to_string(),
            },
        };

        let total = report.total();
        let high = report.high_severity();
        if high > 2 {
            report.assessment = Assessment {
                kind: AssessmentKind::Concern,
                description: format!(
                    "Multiple high-priority gaps identified ({} critical areas)",
                    high
                ),
            };
        } else if total > 0 {
            report.assessment = Assessment {
                kind: AssessmentKind::Moderate,
                description: format!(
                    "Some gaps identified but overall solid profile ({} total gaps)",
                    total
                ),
            };
        }
        report
    }

    /// Parse the loose date strings people put on résumés. Empty and
    /// open-ended values resolve to today.
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty()
            || ["present", "current", "ongoing"].contains(&value.to_lowercase().as_str())
        {
            return Some(self.today);
        }

        for format in FULL_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date);
            }
        }

        let with_day = format!("{} 1", value);
        for format in MONTH_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&with_day, &format!("{} %d", format)) {
                return Some(date);
            }
        }

        self.find_year(value).and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
    }

    fn find_year(&self, value: &str) -> Option<i32> {
        self.year_regex
            .find(value)
            .and_then(|m| m.as_str().parse().ok())
    }

    fn experience_gaps(&self, profile: &ResumeProfile) -> Vec<EmploymentGap> {
        let mut jobs: Vec<Job> = profile
            .experience
            .values()
            .filter(|e| !e.start.trim().is_empty())
            .filter_map(|e| {
                let start = self.parse_date(&e.start)?;
                let end = self.parse_date(&e.end).unwrap_or(self.today);
                Some(Job {
                    start,
                    end,
                    title: e.title.trim(),
                    company: e.company.trim(),
                })
            })
            .collect();
        jobs.sort_by_key(|job| job.start);

        jobs.windows(2)
            .filter_map(|pair| {
                let (current, next) = (&pair[0], &pair[1]);
                let months = (next.start.year() - current.end.year()) * 12
                    + (next.start.month() as i32 - current.end.month() as i32);
                (months > 1).then(|| EmploymentGap {
                    from: current.end.format("%B %Y").to_string(),
                    to: next.start.format("%B %Y").to_string(),
                    duration_months: months,
                    description: format!(
                        "Gap between {} at {} and {} at {}",
                        current.title, current.company, next.title, next.company
                    ),
                })
            })
            .collect()
    }

    fn education_gaps(&self, profile: &ResumeProfile) -> Vec<Finding> {
        let mut findings = Vec::new();

        if profile.education.is_empty() {
            findings.push(Finding {
                kind: FindingKind::EducationMissing,
                severity: Severity::High,
                description: "No formal education information provided".to_string(),
            });
            return findings;
        }

        let highest_level = profile
            .education
            .values()
            .map(|e| degree_level(&e.degree))
            .max()
            .unwrap_or(0);

        if highest_level == 0 {
            findings.push(Finding {
                kind: FindingKind::EducationLevel,
                severity: Severity::Medium,
                description: "Degree level unclear or not recognized".to_string(),
            });
        }
        if highest_level < BACHELOR_LEVEL {
            findings.push(Finding {
                kind: FindingKind::EducationLevel,
                severity: Severity::Medium,
                description: "No bachelor's degree - may limit opportunities for senior positions"
                    .to_string(),
            });
        }

        let graduation_years: Vec<i32> = profile
            .education
            .values()
            .filter(|e| !e.degree.trim().is_empty())
            .filter_map(|e| self.find_year(&e.year))
            .collect();

        for year in &graduation_years {
            if self.today.year() - year > STALE_EDUCATION_YEARS {
                findings.push(Finding {
                    kind: FindingKind::EducationCurrency,
                    severity: Severity::Low,
                    description: format!(
                        "Education from {} may need updating with recent developments",
                        year
                    ),
                });
            }
        }

        let first_job_start = profile
            .experience
            .values()
            .filter(|e| !e.start.trim().is_empty())
            .filter_map(|e| self.parse_date(&e.start))
            .min();
        let latest_graduation = graduation_years.iter().copied().max();

        if let (Some(first_job), Some(graduated)) = (first_job_start, latest_graduation) {
            if first_job.year() < graduated {
                findings.push(Finding {
                    kind: FindingKind::TimelineMismatch,
                    severity: Severity::Low,
                    description: format!(
                        "First job started before graduation ({} vs {})",
                        first_job.year(),
                        graduated
                    ),
                });
            }
        }

        findings
    }

    fn skill_gaps(&self, profile: &ResumeProfile, job_skills: Option<&BTreeSet<String>>) -> Vec<Finding> {
        let skills = profile.flat_skills();
        if skills.is_empty() {
            return vec![Finding {
                kind: FindingKind::SkillsMissing,
                severity: Severity::High,
                description: "No skills information provided".to_string(),
            }];
        }

        let mut findings = Vec::new();
        let joined = skills.join(" ");
        for (category, keywords) in SKILL_CATEGORIES {
            if !keywords.iter().any(|k| joined.contains(k)) {
                findings.push(Finding {
                    kind: FindingKind::SkillCategory,
                    severity: Severity::Medium,
                    description: format!("Limited {} skills mentioned", category),
                });
            }
        }

        if let Some(required) = job_skills {
            let missing: Vec<String> = required
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|req| !req.is_empty())
                .filter(|req| !skills.iter().any(|skill| skill.contains(req.as_str())))
                .collect();
            if !missing.is_empty() {
                findings.push(Finding {
                    kind: FindingKind::JobRequirements,
                    severity: Severity::High,
                    description: format!("Missing required skills: {}", missing.join(", ")),
                });
            }
        }

        findings
    }
}

/// One-shot gap analysis with `today` as the reference date.
pub fn analyze_gaps(
    profile: &ResumeProfile,
    job_skills: Option<&BTreeSet<String>>,
    today: NaiveDate,
) -> GapReport {
    GapAnalyzer::new(today).analyze(profile, job_skills)
}

const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "technical",
        &[
            "python", "java", "javascript", "sql", "html", "css", "react", "node", "docker",
            "kubernetes", "aws", "azure", "git",
        ],
    ),
    (
        "data",
        &["excel", "powerbi", "tableau", "sql", "python", "statistics", "analytics"],
    ),
    (
        "soft",
        &["communication", "leadership", "teamwork", "problem solving", "project management"],
    ),
    (
        "certifications",
        &["pmp", "scrum", "agile", "cisco", "microsoft", "aws", "google cloud"],
    ),
];

/// 1 = school diploma, 2 = associate, 3 = bachelor, 4 = master, 5 = doctorate,
/// 0 = unrecognized.
///
/// Abbreviations match whole words only, so "Diploma" never reads as "ma".
fn degree_level(degree: &str) -> u8 {
    let lowered = degree.to_lowercase();
    if lowered.contains("high school") {
        return 1;
    }

    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .map(|word| word.replace('.', ""))
        .map(|word| match word.as_str() {
            "diploma" | "ged" => 1,
            "associate" | "associates" => 2,
            "bachelor" | "bachelors" | "ba" | "bs" | "bsc" | "btech" | "be" => 3,
            "master" | "masters" | "ma" | "ms" | "msc" | "mba" | "mtech" => 4,
            "phd" | "doctorate" | "doctoral" => 5,
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Education, Experience};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn job(title: &str, start: &str, end: &str) -> Experience {
        Experience {
            title: title.to_string(),
            company: "Acme".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            ..Experience::default()
        }
    }

    fn degree(name: &str, year: &str) -> Education {
        Education {
            degree: name.to_string(),
            year: year.to_string(),
            ..Education::default()
        }
    }

    fn profile() -> ResumeProfile {
        ResumeProfile {
            skills: vec![
                "Programming: Python, SQL, Docker".to_string(),
                "Communication".to_string(),
                "Agile".to_string(),
            ],
            experience: vec![job("Engineer", "2019-01", "2021-02"), job("Senior Engineer", "2021-03", "present")]
                .into_iter()
                .collect(),
            education: vec![degree("Bachelor of Science", "2018")].into_iter().collect(),
            ..ResumeProfile::default()
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let analyzer = GapAnalyzer::new(today());
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(analyzer.parse_date("2020-03-14"), Some(ymd(2020, 3, 14)));
        assert_eq!(analyzer.parse_date("2020/03/14"), Some(ymd(2020, 3, 14)));
        assert_eq!(analyzer.parse_date("03/14/2020"), Some(ymd(2020, 3, 14)));
        assert_eq!(analyzer.parse_date("2020-03"), Some(ymd(2020, 3, 1)));
        assert_eq!(analyzer.parse_date("03/2020"), Some(ymd(2020, 3, 1)));
        assert_eq!(analyzer.parse_date("March 2020"), Some(ymd(2020, 3, 1)));
        assert_eq!(analyzer.parse_date("Mar 2020"), Some(ymd(2020, 3, 1)));
        assert_eq!(analyzer.parse_date("2020"), Some(ymd(2020, 1, 1)));
        assert_eq!(analyzer.parse_date("Summer of 2017"), Some(ymd(2017, 1, 1)));
        assert_eq!(analyzer.parse_date("Present"), Some(today()));
        assert_eq!(analyzer.parse_date(""), Some(today()));
        assert_eq!(analyzer.parse_date("someday"), None);
    }

    #[test]
    fn test_contiguous_history_has_no_gaps() {
        let report = GapAnalyzer::new(today()).analyze(&profile(), None);
        assert!(report.experience_gaps.is_empty());
    }

    #[test]
    fn test_employment_gap_is_reported() {
        let mut p = profile();
        p.experience = vec![job("Analyst", "2015-01", "2016-06"), job("Engineer", "2017-01", "2018-01")]
            .into_iter()
            .collect();

        let report = GapAnalyzer::new(today()).analyze(&p, None);
        assert_eq!(report.experience_gaps.len(), 1);
        let gap = &report.experience_gaps[0];
        assert_eq!(gap.duration_months, 7);
        assert_eq!(gap.from, "June 2016");
        assert_eq!(gap.to, "January 2017");
        assert!(gap.description.contains("Analyst at Acme"));
    }

    #[test]
    fn test_education_findings() {
        let analyzer = GapAnalyzer::new(today());

        let mut p = profile();
        p.education = Default::default();
        let report = analyzer.analyze(&p, None);
        assert_eq!(report.education_gaps[0].kind, FindingKind::EducationMissing);
        assert_eq!(report.education_gaps[0].severity, Severity::High);

        p.education = vec![degree("Associate of Arts", "2001")].into_iter().collect();
        let kinds: Vec<FindingKind> = analyzer.analyze(&p, None).education_gaps.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::EducationLevel, FindingKind::EducationCurrency]
        );

        p.education = vec![degree("M.Sc. Physics", "2020")].into_iter().collect();
        let report = analyzer.analyze(&p, None);
        assert_eq!(report.education_gaps.len(), 1);
        assert_eq!(report.education_gaps[0].kind, FindingKind::TimelineMismatch);
    }

    #[test]
    fn test_degree_levels() {
        assert_eq!(degree_level("Bachelor of Science"), 3);
        assert_eq!(degree_level("MBA"), 4);
        assert_eq!(degree_level("B.S. Computer Science"), 3);
        assert_eq!(degree_level("PhD, Machine Learning"), 5);
        assert_eq!(degree_level("High School Diploma"), 1);
        assert_eq!(degree_level("Bootcamp certificate"), 0);
    }

    #[test]
    fn test_degree_level_uses_whole_words() {
        assert_eq!(degree_level("Diploma in Accounting"), 1);
        assert_eq!(degree_level("Bachelor of Arts in Mathematics"), 3);
        assert_eq!(degree_level("Master of Business Administration (MBA)"), 4);
        assert_eq!(degree_level("B.Tech Computer Engineering"), 3);
        assert_eq!(degree_level("BE Mechanical"), 3);
        assert_eq!(degree_level("M.Tech, Data Science"), 4);
        assert_eq!(degree_level("Behavioral Science Certificate"), 0);
    }

    #[test]
    fn test_skill_findings() {
        let analyzer = GapAnalyzer::new(today());
        let job_skills: BTreeSet<String> = ["python", "kubernetes"].iter().map(|s| s.to_string()).collect();

        let report = analyzer.analyze(&profile(), Some(&job_skills));
        assert!(report.skill_gaps.iter().all(|f| f.kind != FindingKind::SkillCategory));
        let missing = report
            .skill_gaps
            .iter()
            .find(|f| f.kind == FindingKind::JobRequirements)
            .unwrap();
        assert_eq!(missing.description, "Missing required skills: kubernetes");

        let mut p = profile();
        p.skills.clear();
        let report = analyzer.analyze(&p, Some(&job_skills));
        assert_eq!(report.skill_gaps.len(), 1);
        assert_eq!(report.skill_gaps[0].kind, FindingKind::SkillsMissing);
    }

    #[test]
    fn test_analyze_gaps_matches_analyzer() {
        let report = analyze_gaps(&profile(), None, today());
        assert_eq!(report, GapAnalyzer::new(today()).analyze(&profile(), None));
    }

    #[test]
    fn test_overall_assessment() {
        let analyzer = GapAnalyzer::new(today());
        assert_eq!(analyzer.analyze(&profile(), None).assessment.kind, AssessmentKind::Positive);

        let job_skills: BTreeSet<String> = ["rust".to_string()].into_iter().collect();
        let report = analyzer.analyze(&profile(), Some(&job_skills));
        assert_eq!(report.assessment.kind, AssessmentKind::Moderate);
        assert!(report.assessment.description.contains("1 total gaps"));

        let empty = ResumeProfile::default();
        let report = analyzer.analyze(&empty, Some(&job_skills));
        assert_eq!(report.high_severity(), 2);
        assert_eq!(report.assessment.kind, AssessmentKind::Moderate);

        let mut p = ResumeProfile::default();
        p.skills = vec!["Excel".to_string()];
        let report = analyzer.analyze(&p, Some(&job_skills));
        assert_eq!(report.high_severity(), 2);
        assert_eq!(report.skill_gaps.len(), 4);
    }
}
