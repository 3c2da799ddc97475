// All LLM prompt constants for the matching module. The candidate profile is
// not baked into these — it travels verbatim in the user message, so the same
// prompts work for any profile document.

/// System prompt for batch scoring — enforces a JSON array keyed by ordinal.
pub const BATCH_SYSTEM: &str = "You are evaluating job fit for a specific candidate. \
    You will receive the candidate's profile and a numbered list of jobs.\n\
    \n\
    SCORING (0.0-1.0) — experience level is the #1 factor:\n\
    - 0.85-1.00: entry-level or graduate role with strong overlap with the candidate's stack and domain\n\
    - 0.65-0.85: junior role, strong overlap with the candidate's technical background\n\
    - 0.45-0.65: partial fit — relevant domain but a moderate experience or skills gap\n\
    - 0.20-0.45: too senior for the candidate, or limited overlap\n\
    - 0.00-0.20: explicitly senior leadership, far above the candidate's experience, or wrong function entirely\n\
    \n\
    Respond ONLY with a valid JSON array, one object per job, in order:\n\
    [\n\
      {\"job\": 1, \"score\": 0.88, \"reasons\": [\"Graduate program\", \"Stack matches\", \"Right location\"]},\n\
      {\"job\": 2, \"score\": 0.22, \"reasons\": [\"Requires 5+ years experience\"]}\n\
    ]\n\
    \n\
    2-3 short, specific reasons per job. Mention what matches AND what's missing. \
    Do NOT include any text outside the JSON array. Do NOT use markdown code fences.";

/// System prompt for single-job fallback scoring — enforces a JSON object.
pub const SINGLE_SYSTEM: &str = "You are evaluating job fit for a specific candidate. \
    You will receive the candidate's profile and one job.\n\
    \n\
    SCORING (0.0-1.0) — experience level is the #1 factor:\n\
    - 0.85-1.00: entry-level or graduate role with strong stack and domain overlap\n\
    - 0.65-0.85: junior role with strong technical overlap\n\
    - 0.45-0.65: partial fit — relevant domain but an experience or skills gap\n\
    - 0.20-0.45: too senior or limited overlap\n\
    - 0.00-0.20: senior leadership role or wrong function entirely\n\
    \n\
    Respond ONLY with valid JSON:\n\
    {\"score\": 0.82, \"reasons\": [\"reason 1\", \"reason 2\"]}\n\
    \n\
    2-3 short specific reasons covering fit and gaps. \
    Do NOT include any text outside the JSON object. Do NOT use markdown code fences.";
